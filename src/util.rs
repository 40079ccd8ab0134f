use std::iter::repeat;
use std::path::{Path, PathBuf};

pub fn find_first_subpath<P: AsRef<Path>, F: Fn(&Path) -> bool>(
    root: impl AsRef<Path>,
    subpaths: &[P],
    search: F,
) -> Option<PathBuf> {
    subpaths
        .iter()
        .zip(repeat(root.as_ref()))
        .map(|(b, a)| a.join(b))
        .find(|it: &PathBuf| search(it))
}

/// Trims `value` and checks it is non-empty and at most `max_chars` characters long.
pub fn bounded_text(value: &str, max_chars: usize) -> Result<String, &'static str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("cannot be blank");
    }
    if trimmed.chars().count() > max_chars {
        return Err("is too long");
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_first_existing_subpath() {
        let found = find_first_subpath("/root", &["a.yml", "b.yml"], |p| p.ends_with("b.yml"));
        assert_eq!(found, Some(PathBuf::from("/root/b.yml")));
    }

    #[test]
    fn bounded_text_trims_and_checks_length() {
        assert_eq!(bounded_text("  3-A  ", 10), Ok("3-A".to_string()));
        assert_eq!(bounded_text("   ", 10), Err("cannot be blank"));
        assert_eq!(bounded_text("abcdef", 5), Err("is too long"));
    }
}
