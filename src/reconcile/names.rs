//! Name comparison tolerant of a middle initial ("Petar M. Petrović").

/// Lowercased tokens of a name. A three-token name whose middle token is a
/// one or two character initial ending in `.` drops that token.
pub fn reduce(name: &str) -> Vec<String> {
    let tokens: Vec<String> = name.split_whitespace().map(str::to_lowercase).collect();
    match tokens.as_slice() {
        [first, middle, last] if is_initial(middle) => vec![first.clone(), last.clone()],
        _ => tokens,
    }
}

fn is_initial(token: &str) -> bool {
    token.ends_with('.') && (1..=2).contains(&token.chars().count())
}

/// True when no reduced token of `name` occurs in the reduced text of `other`.
pub fn still_differ(name: &str, other: &str) -> bool {
    let other = reduce(other).join(" ");
    !reduce(name).iter().any(|t| other.contains(t.as_str()))
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn middle_initial_dropped() {
        assert_eq!(reduce("Petar M. Petrović"), vec!["petar", "petrović"]);
        assert_eq!(reduce("Ana Đ. Anić"), vec!["ana", "anić"]);
    }

    #[test]
    fn other_shapes_untouched() {
        assert_eq!(reduce("Petar Mi. Petrović Jr"), vec!["petar", "mi.", "petrović", "jr"]);
        assert_eq!(reduce("Petar Mil. Petrović"), vec!["petar", "mil.", "petrović"]);
        assert_eq!(reduce("Petar M Petrović"), vec!["petar", "m", "petrović"]);
        assert!(reduce("  ").is_empty());
    }

    #[test]
    fn initial_alone_is_not_a_difference() {
        assert!(!still_differ("Petar M. Petrović", "Petar Petrović"));
        assert!(!still_differ("Petar M. Petrović", "Petar Petrović, Ana Anić"));
        assert!(still_differ("Petar M. Petrović", "Jovan Jovanović"));
    }
}
