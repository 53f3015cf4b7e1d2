use crate::common::metadata::GF;

// GF(113) arithmetic
//------------------------------------------------------------------------------

/// GF(113) is a prime field; 3 is a primitive element, so the log/antilog
/// tables cover all 112 non-zero residues.
const PRIMITIVE: usize = 3;

struct Field {
    log: [u8; GF],
    alog: [u8; GF - 1],
}

impl Field {
    fn new() -> Self {
        let mut log = [0u8; GF];
        let mut alog = [0u8; GF - 1];
        let mut v = 1usize;
        for (i, a) in alog.iter_mut().enumerate() {
            *a = v as u8;
            log[v] = i as u8;
            v = v * PRIMITIVE % GF;
        }
        debug_assert!(v == 1, "Primitive element order mismatch: {v}");
        Self { log, alog }
    }

    fn mul(&self, a: u8, b: u8) -> u8 {
        if a == 0 || b == 0 {
            return 0;
        }
        let log_sum = self.log[a as usize] as usize + self.log[b as usize] as usize;
        self.alog[log_sum % (GF - 1)]
    }

    /// alpha^i
    fn exp(&self, i: usize) -> u8 {
        self.alog[i % (GF - 1)]
    }
}

// Reed-Solomon generator
//------------------------------------------------------------------------------

/// Appends `ecc_len` check codewords to `data`, leaving the data codewords
/// unchanged in place. Streams longer than 112 codewords are split into
/// `ceil(total / 112)` interleaved sub-blocks, each encoded independently;
/// block `j` holds every step-th codeword of the full output starting at `j`.
pub fn rs_encode(data: &[u8], ecc_len: usize) -> Vec<u8> {
    debug_assert!(data.iter().all(|&c| (c as usize) < GF), "Codeword out of field range");

    let field = Field::new();
    let total = data.len() + ecc_len;
    let step = total.div_ceil(GF - 1);

    let mut out = vec![0u8; total];
    out[..data.len()].copy_from_slice(data);

    for j in 0..step {
        let block: Vec<u8> = data[j..].iter().copied().step_by(step).collect();
        let block_ecc_len = (data.len()..total).filter(|p| p % step == j).count();
        if block_ecc_len == 0 {
            continue;
        }
        let checks = rs_block(&field, &block, block_ecc_len);
        let positions = (data.len()..total).filter(|p| p % step == j);
        for (p, c) in positions.zip(checks) {
            out[p] = c;
        }
    }

    out
}

/// Remainder-based systematic encoding for a single block: the check
/// codewords are the negated remainder of d(x) * x^t modulo the generator
/// polynomial with roots alpha^1 .. alpha^t.
fn rs_block(field: &Field, block: &[u8], ecc_len: usize) -> Vec<u8> {
    let gen = generator_poly(field, ecc_len);

    let mut buf = block.to_vec();
    buf.resize(block.len() + ecc_len, 0);

    for i in 0..block.len() {
        let coef = buf[i];
        if coef == 0 {
            continue;
        }
        // Subtract coef * gen, aligned at i; gen is monic so buf[i] zeroes out.
        for (k, &g) in gen.iter().enumerate() {
            let sub = field.mul(coef, g) as usize;
            buf[i + k] = ((buf[i + k] as usize + GF - sub) % GF) as u8;
        }
    }

    buf.split_off(block.len()).iter().map(|&r| ((GF - r as usize) % GF) as u8).collect()
}

/// Iterative convolution of (x - alpha^1)(x - alpha^2)..(x - alpha^degree),
/// coefficients most significant first, leading coefficient 1.
fn generator_poly(field: &Field, degree: usize) -> Vec<u8> {
    let mut gen = vec![0u8; degree + 1];
    gen[0] = 1;
    for i in 1..=degree {
        let root = field.exp(i);
        for k in (1..=i).rev() {
            let t = field.mul(gen[k - 1], root) as usize;
            gen[k] = ((gen[k] as usize + GF - t) % GF) as u8;
        }
    }
    gen
}

#[cfg(test)]
mod ec_tests {
    use super::{generator_poly, rs_block, rs_encode, Field};
    use crate::common::metadata::GF;

    fn poly_eval(poly: &[u8], x: u8) -> u8 {
        poly.iter().fold(0usize, |acc, &c| (acc * x as usize + c as usize) % GF) as u8
    }

    #[test]
    fn test_field_tables() {
        let f = Field::new();
        for a in 1..GF as u8 {
            for b in 1..GF as u8 {
                assert_eq!(f.mul(a, b) as usize, a as usize * b as usize % GF);
            }
        }
    }

    #[test]
    fn test_generator_poly_roots() {
        let f = Field::new();
        for degree in 1..=12 {
            let gen = generator_poly(&f, degree);
            assert_eq!(gen.len(), degree + 1);
            assert_eq!(gen[0], 1);
            for i in 1..=degree {
                assert_eq!(poly_eval(&gen, f.exp(i)), 0, "degree {degree} root {i}");
            }
        }
    }

    #[test]
    fn test_block_codeword_has_generator_roots() {
        let f = Field::new();
        let block = [5u8, 77, 0, 112, 34, 9];
        let checks = rs_block(&f, &block, 4);
        assert_eq!(checks.len(), 4);
        let mut codeword = block.to_vec();
        codeword.extend(&checks);
        for i in 1..=4 {
            assert_eq!(poly_eval(&codeword, f.exp(i)), 0, "root {i}");
        }
    }

    #[test]
    fn test_systematic() {
        let data: Vec<u8> = (0..60usize).map(|i| (i * 7 % GF) as u8).collect();
        let out = rs_encode(&data, 33);
        assert_eq!(out.len(), 93);
        assert_eq!(&out[..60], &data[..]);
    }

    #[test]
    fn test_interleaved_blocks_have_roots() {
        let f = Field::new();
        // 150 data + 78 ecc > 112 forces step 3
        let data: Vec<u8> = (0..150u16).map(|i| (i * 31 % GF as u16) as u8).collect();
        let ecc_len = 78;
        let out = rs_encode(&data, ecc_len);
        let total = data.len() + ecc_len;
        let step = total.div_ceil(GF - 1);
        assert_eq!(step, 3);

        for j in 0..step {
            let block: Vec<u8> = out[j..].iter().copied().step_by(step).collect();
            let ecc_in_block =
                (data.len()..total).filter(|p| p % step == j).count();
            assert!(ecc_in_block > 0);
            for i in 1..=ecc_in_block {
                assert_eq!(poly_eval(&block, f.exp(i)), 0, "block {j} root {i}");
            }
        }
    }

    #[test]
    fn test_zero_data() {
        let out = rs_encode(&[0, 0, 0], 3);
        assert_eq!(out, vec![0; 6]);
    }
}
