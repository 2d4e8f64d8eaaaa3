use std::sync::RwLock;

/// One level of a subscription pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    /// `+`: exactly one level.
    Single,
    /// `#`: zero or more trailing levels. Only valid last.
    Rest,
}

/// A parsed MQTT-style pattern over `/`-separated paths.
///
/// `relation/like/+/p1` matches `relation/like/alice/p1`;
/// `relation/#` matches `relation`, `relation/like` and everything below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    raw: String,
    segments: Vec<Segment>,
}

impl Pattern {
    /// Parse a pattern. A `#` anywhere but the last level is kept as a
    /// literal segment, so it can only ever match a path containing `#`.
    pub fn parse(raw: &str) -> Self {
        let parts: Vec<&str> = raw.split('/').collect();
        let last = parts.len().saturating_sub(1);
        let segments = parts
            .iter()
            .enumerate()
            .map(|(i, part)| match *part {
                "+" => Segment::Single,
                "#" if i == last => Segment::Rest,
                other => Segment::Literal(other.to_string()),
            })
            .collect();
        Self {
            raw: raw.to_string(),
            segments,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// True when the pattern contains no wildcard.
    pub fn is_exact(&self) -> bool {
        self.segments
            .iter()
            .all(|s| matches!(s, Segment::Literal(_)))
    }

    pub fn matches(&self, path: &str) -> bool {
        let mut levels = path.split('/');
        for segment in &self.segments {
            match segment {
                Segment::Rest => return true,
                Segment::Single => {
                    if levels.next().is_none() {
                        return false;
                    }
                }
                Segment::Literal(lit) => match levels.next() {
                    Some(level) if level == lit => {}
                    _ => return false,
                },
            }
        }
        levels.next().is_none()
    }
}

/// Thread-safe list of `(pattern, value)` entries queried by concrete path.
///
/// Entries are returned in registration order, which is also the order in
/// which the router runs handlers.
pub struct PatternTable<T> {
    entries: RwLock<Vec<(Pattern, T)>>,
}

impl<T: Clone> PatternTable<T> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    pub fn insert(&self, pattern: &str, value: T) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.push((Pattern::parse(pattern), value));
    }

    /// All values whose pattern matches `path`.
    pub fn matching(&self, path: &str) -> Vec<T> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries
            .iter()
            .filter(|(pattern, _)| pattern.matches(path))
            .map(|(_, value)| value.clone())
            .collect()
    }

    /// Remove values registered under exactly `pattern` that satisfy
    /// `predicate`. Returns whether anything was removed.
    pub fn remove<F>(&self, pattern: &str, predicate: F) -> bool
    where
        F: Fn(&T) -> bool,
    {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        entries.retain(|(p, value)| !(p.as_str() == pattern && predicate(value)));
        entries.len() < before
    }

    /// Whether a value was registered under exactly `pattern`.
    pub fn has_pattern(&self, pattern: &str) -> bool {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.iter().any(|(p, _)| p.as_str() == pattern)
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone> Default for PatternTable<T> {
    fn default() -> Self {
        Self::new()
    }
}
