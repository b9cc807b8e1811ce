pub struct StatsHelper;

impl StatsHelper {
    /// Smallest and largest finite value, `None` when there is none.
    pub fn bounds(samples: &[f64]) -> Option<(f64, f64)> {
        samples
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((min, max)) => Some((min.min(v), max.max(v))),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_of_empty_sequence_is_none() {
        assert_eq!(StatsHelper::bounds(&[]), None);
        assert_eq!(StatsHelper::bounds(&[f64::NAN]), None);
    }

    #[test]
    fn bounds_ignore_order() {
        assert_eq!(StatsHelper::bounds(&[5.1, 4.2, 8.5]), Some((4.2, 8.5)));
    }
}
