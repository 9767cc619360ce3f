use rand::Rng;

/// Shown when a habit gets completed a second time on the same day.
pub const ALREADY_DONE_MESSAGE: &str = "Mission accomplished! Return stronger tomorrow! 💪";

/// Fixed pool of encouragements shown after a successful completion.
pub static MOTIVATIONAL_MESSAGES: [&str; 5] = [
    "Progress > Perfection. 💡",
    "You vs. Yesterday. 🏆",
    "Discipline over motivation. ⚡",
    "Growth happens now. 🌟",
    "Show up. Win. Repeat. 🔄",
];

/// Chooses which encouragement to show. This can allow the selection to be pinned during testing.
pub trait MessagePicker: Send + 'static {
    fn pick(&mut self, options: &'static [&'static str]) -> &'static str;
}

/// Uniform selection from the pool.
pub struct RandomMessagePicker;

impl MessagePicker for RandomMessagePicker {
    fn pick(&mut self, options: &'static [&'static str]) -> &'static str {
        options[rand::rng().random_range(0..options.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::{MessagePicker, RandomMessagePicker, MOTIVATIONAL_MESSAGES};

    #[test]
    fn test_random_picker_stays_in_pool() {
        let mut picker = RandomMessagePicker;
        for _ in 0..100 {
            let picked = picker.pick(&MOTIVATIONAL_MESSAGES);
            assert!(MOTIVATIONAL_MESSAGES.contains(&picked));
        }
    }
}
