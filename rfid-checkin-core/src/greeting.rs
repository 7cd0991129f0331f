use core::fmt;

/// Greeting shown for a tap, alternating with every tap of the same tag.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Greeting {
    /// Odd tap count, the holder is checking in.
    Hello,
    /// Even tap count, the holder is checking out.
    Goodbye,
}

impl Greeting {
    /// Picks the greeting for the cumulative tap count of a tag.
    pub fn for_tap_count(tap_count: u32) -> Self {
        if tap_count % 2 == 0 {
            Greeting::Goodbye
        } else {
            Greeting::Hello
        }
    }
}

impl fmt::Display for Greeting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Greeting::Hello => write!(f, "Hello"),
            Greeting::Goodbye => write!(f, "Goodbye"),
        }
    }
}

#[cfg(all(test, feature = "std"))]
mod test {
    use super::*;
    use std::format;

    #[test]
    fn odd_counts_say_hello() {
        for count in [1u32, 3, 5, 41, u32::MAX] {
            assert_eq!(Greeting::Hello, Greeting::for_tap_count(count));
        }
    }

    #[test]
    fn even_counts_say_goodbye() {
        for count in [0u32, 2, 4, 100, u32::MAX - 1] {
            assert_eq!(Greeting::Goodbye, Greeting::for_tap_count(count));
        }
    }

    #[test]
    fn greeting_alternates() {
        let mut previous = Greeting::for_tap_count(1);
        for count in 2u32..=20 {
            let current = Greeting::for_tap_count(count);
            assert_ne!(previous, current);
            previous = current;
        }
    }

    #[test]
    fn greeting_format() {
        assert_eq!("Hello", format!("{}", Greeting::Hello));
        assert_eq!("Goodbye", format!("{}", Greeting::Goodbye));
    }
}
