use super::bank::Bank;

/// Index into a code table
pub type LogicalIndex = usize;

/// Maps the inclusive input band `first..=last` onto consecutive logical
/// indices starting at `index`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeRule {
    pub first: u8,
    pub last: u8,
    pub index: LogicalIndex,
}

impl RangeRule {
    pub fn new(first: u8, last: u8, index: LogicalIndex) -> Self {
        Self { first, last, index }
    }

    fn contains(&self, input: u8) -> bool {
        (self.first..=self.last).contains(&input)
    }

    /// Largest index this rule yields in bank 0, `None` on overflow
    pub fn max_index(&self) -> Option<LogicalIndex> {
        self.index
            .checked_add(self.last.saturating_sub(self.first) as LogicalIndex)
    }

    pub fn overlaps(&self, other: &RangeRule) -> bool {
        self.first <= other.last && other.first <= self.last
    }
}

/// A rule's index plus its bank offset does not fit in a `LogicalIndex`
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("logical index overflows")]
pub struct IndexOverflow;

/// Piecewise mapping from a note or controller number to a logical index
///
/// `index = rule.index + (input - rule.first) + bank * stride` for the
/// first rule whose band contains `input`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeMapper {
    rules: Vec<RangeRule>,
    stride: usize,
}

impl RangeMapper {
    pub fn new(rules: Vec<RangeRule>, stride: usize) -> Self {
        Self { rules, stride }
    }

    pub fn map(&self, input: u8, bank: Bank) -> Option<LogicalIndex> {
        let rule = self.rules.iter().find(|rule| rule.contains(input))?;
        self.offset(bank)?
            .checked_add(rule.index)?
            .checked_add((input - rule.first) as LogicalIndex)
    }

    /// First index of `bank`
    fn offset(&self, bank: Bank) -> Option<LogicalIndex> {
        (bank as usize).checked_mul(self.stride)
    }

    /// Largest index reachable with `banks` banks
    ///
    /// `Ok(None)` without rules. Every index `map` can return for a bank
    /// below `banks` is at most this value.
    pub fn max_index(&self, banks: u16) -> Result<Option<LogicalIndex>, IndexOverflow> {
        let top_bank = banks.max(1) - 1;
        let mut max: Option<LogicalIndex> = None;
        for rule in &self.rules {
            let index = self
                .offset(top_bank)
                .and_then(|offset| offset.checked_add(rule.max_index()?))
                .ok_or(IndexOverflow)?;
            max = max.max(Some(index));
        }
        Ok(max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn banded() -> RangeMapper {
        RangeMapper::new(
            vec![RangeRule::new(41, 44, 0), RangeRule::new(57, 60, 4)],
            24,
        )
    }

    #[test]
    fn test_map_inside_bands() {
        let mapper = banded();
        assert_eq!(mapper.map(41, 0), Some(0));
        assert_eq!(mapper.map(44, 0), Some(3));
        assert_eq!(mapper.map(57, 0), Some(4));
        assert_eq!(mapper.map(60, 1), Some(31));
    }

    #[test]
    fn test_map_outside_bands() {
        let mapper = banded();
        for input in [0, 40, 45, 56, 61, 127] {
            assert_eq!(mapper.map(input, 0), None);
        }
    }

    #[test]
    fn test_single_rules_form_flat_table() {
        let mapper = RangeMapper::new(vec![RangeRule::new(1, 1, 0), RangeRule::new(7, 7, 1)], 0);
        assert_eq!(mapper.map(1, 0), Some(0));
        assert_eq!(mapper.map(7, 0), Some(1));
        assert_eq!(mapper.map(2, 0), None);
    }

    #[test]
    fn test_max_index() {
        let mapper = banded();
        assert_eq!(mapper.max_index(1), Ok(Some(7)));
        assert_eq!(mapper.max_index(2), Ok(Some(31)));
        assert_eq!(RangeMapper::new(Vec::new(), 24).max_index(1), Ok(None));
    }

    #[test]
    fn test_huge_stride_overflows() {
        let mapper = RangeMapper::new(vec![RangeRule::new(60, 60, 1)], usize::MAX);
        assert_eq!(mapper.max_index(2), Err(IndexOverflow));
        // One bank never multiplies the stride
        assert_eq!(mapper.max_index(1), Ok(Some(1)));
        assert_eq!(mapper.map(60, 0), Some(1));
        assert_eq!(mapper.map(60, 1), None);
    }

    #[test]
    fn test_huge_index_overflows() {
        let mapper = RangeMapper::new(vec![RangeRule::new(10, 20, usize::MAX - 5)], 0);
        assert_eq!(mapper.max_index(1), Err(IndexOverflow));
        assert_eq!(mapper.map(15, 0), Some(usize::MAX));
        assert_eq!(mapper.map(16, 0), None);
    }

    #[test]
    fn test_overlaps() {
        let a = RangeRule::new(10, 20, 0);
        assert!(a.overlaps(&RangeRule::new(20, 25, 0)));
        assert!(a.overlaps(&RangeRule::new(15, 15, 0)));
        assert!(!a.overlaps(&RangeRule::new(21, 30, 0)));
    }
}
