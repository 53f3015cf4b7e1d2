use num_traits::PrimInt;

// Bit stream for the dot pattern expansion
//------------------------------------------------------------------------------

/// MSB-first bit buffer sized from the symbol's dot capacity.
#[derive(Debug, Clone)]
pub struct BitStream {
    data: Vec<u8>,
    // Bit length
    len: usize,
    // Max bit capacity
    capacity: usize,
}

impl BitStream {
    pub fn new(capacity: usize) -> Self {
        Self { data: vec![0; capacity.div_ceil(8)], len: 0, capacity }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn push(&mut self, bit: bool) {
        debug_assert!(
            self.len < self.capacity,
            "Insufficient capacity: Capacity {}, Size {}",
            self.capacity,
            self.len + 1
        );

        if bit {
            let offset = self.len & 7;
            let pos = self.len >> 3;
            self.data[pos] |= 0b10000000 >> offset;
        }

        self.len += 1;
    }

    /// Appends the low `size` bits of `bits`, most significant first.
    pub fn push_bits<T: PrimInt>(&mut self, bits: T, size: usize) {
        debug_assert!(
            size >= (T::zero().count_zeros() - bits.leading_zeros()) as usize,
            "Bit count shouldn't exceed bit length: Length {size}"
        );

        for i in (0..size).rev() {
            self.push(bits >> i & T::one() == T::one());
        }
    }

    pub fn get(&self, index: usize) -> bool {
        debug_assert!(index < self.len, "Index {index} out of bounds: Length {}", self.len);

        self.data[index >> 3] >> (7 - (index & 7)) & 1 == 1
    }
}
