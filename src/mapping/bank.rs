/// Bank number selected by the MIDI channel
pub type Bank = u16;

/// Derives the bank from the channel of an incoming message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankResolver {
    /// Every channel addresses bank 0
    Single,
    /// `bank = channel - base_channel`, valid while `0 <= bank < banks`
    Channels { base_channel: u8, banks: u8 },
}

impl BankResolver {
    /// Resolve the bank for `channel`, or `None` when the channel lies
    /// outside the banked range (the message is then unmapped)
    pub fn resolve(&self, channel: u8) -> Option<Bank> {
        match *self {
            BankResolver::Single => Some(0),
            BankResolver::Channels { base_channel, banks } => {
                let bank = channel.checked_sub(base_channel)?;
                (bank < banks).then_some(bank as Bank)
            }
        }
    }

    /// Number of banks addressable through this resolver
    pub fn count(&self) -> u16 {
        match *self {
            BankResolver::Single => 1,
            BankResolver::Channels { banks, .. } => banks as u16,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_bank_ignores_channel() {
        for channel in 0..16 {
            assert_eq!(BankResolver::Single.resolve(channel), Some(0));
        }
        assert_eq!(BankResolver::Single.count(), 1);
    }

    #[test]
    fn test_channels_offset_by_base() {
        let banks = BankResolver::Channels { base_channel: 8, banks: 2 };
        assert_eq!(banks.resolve(8), Some(0));
        assert_eq!(banks.resolve(9), Some(1));
        assert_eq!(banks.count(), 2);
    }

    #[test]
    fn test_negative_bank_is_unmapped() {
        let banks = BankResolver::Channels { base_channel: 8, banks: 8 };
        for channel in 0..8 {
            assert_eq!(banks.resolve(channel), None);
        }
    }

    #[test]
    fn test_bank_past_count_is_unmapped() {
        let banks = BankResolver::Channels { base_channel: 8, banks: 1 };
        assert_eq!(banks.resolve(9), None);
        assert_eq!(banks.resolve(15), None);
    }
}
