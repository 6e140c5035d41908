//! Luhn (mod 10) checksum for card-number candidates.

/// Fewest digits a card number can have.
pub const MIN_CARD_DIGITS: usize = 13;

/// Most digits a card number can have.
pub const MAX_CARD_DIGITS: usize = 19;

/// Validate a card-number candidate with the Luhn algorithm.
///
/// Separators and any other non-digit characters are ignored. Candidates
/// with fewer than 13 or more than 19 digits are invalid without running
/// the checksum.
#[must_use]
pub fn is_valid_card(candidate: &str) -> bool {
    let digits: Vec<u32> = candidate.chars().filter_map(|c| c.to_digit(10)).collect();

    if !(MIN_CARD_DIGITS..=MAX_CARD_DIGITS).contains(&digits.len()) {
        return false;
    }

    let checksum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(idx, &digit)| {
            if idx % 2 == 1 {
                let doubled = digit * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                digit
            }
        })
        .sum();

    checksum % 10 == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_valid_numbers() {
        let valid = [
            "4532015112830366",    // Visa test number
            "5425233430109903",    // Mastercard test number
            "4111111111111111",
            "378282246310005",     // Amex, 15 digits
            "4222222222222",       // 13 digits
            "6011000990139424",
        ];

        for number in valid {
            assert!(is_valid_card(number), "Expected valid: {number}");
        }
    }

    #[test]
    fn test_known_invalid_numbers() {
        assert!(!is_valid_card("1234567812345678"));
        assert!(!is_valid_card("4532015112830367"));
    }

    #[test]
    fn test_separators_ignored() {
        assert!(is_valid_card("4532-0151-1283-0366"));
        assert!(is_valid_card("5425 2334 3010 9903"));
    }

    #[test]
    fn test_length_bounds() {
        // Twelve digits with a valid checksum still fail the length gate
        assert!(!is_valid_card("000000000000"));
        assert!(is_valid_card("0000000000000"));
        assert!(is_valid_card(&"0".repeat(19)));
        assert!(!is_valid_card(&"0".repeat(20)));
    }

    #[test]
    fn test_no_digits() {
        assert!(!is_valid_card(""));
        assert!(!is_valid_card("not a card"));
    }

    #[test]
    fn test_non_ascii_digits_do_not_count() {
        // Arabic-Indic rendering of 4532015112830366
        assert!(!is_valid_card("٤٥٣٢٠١٥١١٢٨٣٠٣٦٦"));
    }
}
