use super::rules::LogicalIndex;

/// Ordered device codes, one per logical index
/// Fixed once the profile is built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable {
    codes: Vec<u16>,
}

impl CodeTable {
    pub fn new(codes: Vec<u16>) -> Self {
        Self { codes }
    }

    /// Device code for a logical index
    ///
    /// Profiles are validated so every index a mapper can produce is in
    /// range; an out-of-range index is a bug and panics.
    pub fn code(&self, index: LogicalIndex) -> u16 {
        self.codes[index]
    }

    pub fn codes(&self) -> &[u16] {
        &self.codes
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_direct_index() {
        let table = CodeTable::new(vec![0x100, 0x101, 0x130]);
        assert_eq!(table.code(0), 0x100);
        assert_eq!(table.code(2), 0x130);
        assert_eq!(table.len(), 3);
        assert!(!table.is_empty());
    }

    #[test]
    #[should_panic]
    fn test_out_of_range_index_panics() {
        CodeTable::new(vec![0x100]).code(1);
    }
}
