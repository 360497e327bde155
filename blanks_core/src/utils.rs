pub trait VecExtensions<T> {
    fn remove_first_where<F>(&mut self, predicate: F) -> Option<T>
    where
        F: Fn(&T) -> bool;
}

impl<T> VecExtensions<T> for Vec<T> {
    fn remove_first_where<F>(&mut self, predicate: F) -> Option<T>
    where
        F: Fn(&T) -> bool,
    {
        self.iter()
            .position(predicate)
            .map(|index| self.remove(index))
    }
}

pub trait StrExtensions {
    /// Trims surrounding whitespace and keeps at most `max` characters.
    /// Returns `None` when nothing is left.
    fn clamped(&self, max: usize) -> Option<String>;
}

impl StrExtensions for str {
    fn clamped(&self, max: usize) -> Option<String> {
        let text: String = self.trim().chars().take(max).collect();
        let text = text.trim_end();
        if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_first_where_should_only_take_the_first_match() {
        let mut v = vec![1, 2, 3, 2];

        assert_eq!(v.remove_first_where(|&x| x == 2), Some(2));
        assert_eq!(v, vec![1, 3, 2]);
        assert_eq!(v.remove_first_where(|&x| x == 9), None);
    }

    #[test]
    fn clamped_should_trim_and_cut_by_characters() {
        assert_eq!("  héllo world ".clamped(5), Some("héllo".to_string()));
        assert_eq!("   ".clamped(10), None);
        assert_eq!("ab cd".clamped(3), Some("ab".to_string()));
    }
}
