// ICAO 9303 check digits: weights 7, 3, 1 repeating, digits count as
// themselves, A-Z as 10-35 and the filler as 0.
const WEIGHTS: [u32; 3] = [7, 3, 1];

pub struct MrzValidator;

impl MrzValidator {
    pub fn check_digit(data: &str) -> u32 {
        let sum: u32 = data
            .chars()
            .enumerate()
            .map(|(i, c)| Self::char_value(c) * WEIGHTS[i % 3])
            .sum();
        sum % 10
    }

    /// `None` when there is nothing to verify: the check column was dropped
    /// or holds a filler.
    pub fn verify(data: &str, check: Option<char>) -> Option<bool> {
        match check {
            None | Some('<') => None,
            Some(c) => Some(c.to_digit(10) == Some(Self::check_digit(data))),
        }
    }

    fn char_value(c: char) -> u32 {
        match c {
            '0'..='9' => c as u32 - '0' as u32,
            'A'..='Z' => c as u32 - 'A' as u32 + 10,
            _ => 0,
        }
    }
}
