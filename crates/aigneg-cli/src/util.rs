use std::fmt;
use std::time::Duration;

// spell-checker:ignore subsec

/// Human-readable durations
pub struct HDuration(pub Duration);

impl fmt::Display for HDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = self.0;
        if d.as_secs() != 0 {
            return write!(f, "{:.3} s", d.as_secs_f64());
        }
        let ms = d.subsec_millis();
        if ms != 0 {
            return write!(f, "{}.{:03} ms", ms, d.subsec_micros() % 1000);
        }
        let us = d.subsec_micros();
        if us != 0 {
            return write!(f, "{us} us");
        }
        write!(f, "{} ns", d.subsec_nanos())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::HDuration;

    #[test]
    fn units() {
        let fmt = |d| HDuration(d).to_string();
        assert_eq!(fmt(Duration::from_nanos(17)), "17 ns");
        assert_eq!(fmt(Duration::from_micros(42)), "42 us");
        assert_eq!(fmt(Duration::from_micros(1_250)), "1.250 ms");
        assert_eq!(fmt(Duration::from_millis(2_500)), "2.500 s");
        assert_eq!(fmt(Duration::from_secs(90)), "90.000 s");
    }
}
