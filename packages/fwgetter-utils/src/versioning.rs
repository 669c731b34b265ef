use std::cmp::Ordering;
use std::fmt;

const MIN_PARTS: usize = 3;

/// Dotted numeric firmware version such as `v2.0.5`.
///
/// Parsing never fails: anything malformed becomes `0.0.0`, the lowest
/// possible version. Components are compared pairwise, the shorter side
/// padded with zeros, so `1.2 == 1.2.0` and `1.2.3.0 == 1.2.3`.
#[derive(Debug, Clone)]
pub struct VersionCode {
    parts: Vec<u64>,
}

impl VersionCode {
    pub fn zero() -> Self {
        VersionCode {
            parts: vec![0; MIN_PARTS],
        }
    }

    pub fn parse(version: Option<&str>) -> Self {
        match version {
            Some(version) => Self::from_str_lossy(version),
            None => Self::zero(),
        }
    }

    pub fn from_str_lossy(version: &str) -> Self {
        if version.is_empty() {
            return Self::zero();
        }
        let normalized = version.to_lowercase();
        let normalized = normalized.strip_prefix('v').unwrap_or(&normalized);

        let mut parts = Vec::with_capacity(MIN_PARTS);
        for segment in normalized.split('.') {
            match segment.trim().parse::<u64>() {
                Ok(value) => parts.push(value),
                Err(_) => return Self::zero(),
            }
        }
        if parts.len() < MIN_PARTS {
            parts.resize(MIN_PARTS, 0);
        }
        VersionCode { parts }
    }

    pub fn parts(&self) -> &[u64] {
        &self.parts
    }

    pub fn is_zero(&self) -> bool {
        self.parts.iter().all(|part| *part == 0)
    }
}

impl Default for VersionCode {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<(u64, u64, u64)> for VersionCode {
    fn from((major, minor, patch): (u64, u64, u64)) -> Self {
        VersionCode {
            parts: vec![major, minor, patch],
        }
    }
}

impl Ord for VersionCode {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.parts.len().max(other.parts.len());
        (0..len)
            .map(|i| {
                let left = self.parts.get(i).copied().unwrap_or(0);
                let right = other.parts.get(i).copied().unwrap_or(0);
                left.cmp(&right)
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for VersionCode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for VersionCode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VersionCode {}

impl fmt::Display for VersionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.parts.iter().map(u64::to_string).collect();
        write!(f, "{}", parts.join("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_absent_or_empty() {
        assert_eq!(VersionCode::parse(None).parts(), &[0, 0, 0]);
        assert_eq!(VersionCode::parse(Some("")).parts(), &[0, 0, 0]);
        assert_eq!(VersionCode::parse(Some("")), VersionCode::parse(None));
    }

    #[test]
    fn test_parse_prefix_and_padding() {
        assert_eq!(VersionCode::from_str_lossy("v1.2").parts(), &[1, 2, 0]);
        assert_eq!(VersionCode::from_str_lossy("V2.0.5").parts(), &[2, 0, 5]);
        assert_eq!(VersionCode::from_str_lossy("3").parts(), &[3, 0, 0]);
        assert_eq!(VersionCode::from_str_lossy("1.2.3.4").parts(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_parse_malformed_is_zero() {
        for input in ["abc", "1.x.3", "1..2", "v", "1.2-beta", "-1.0", "99999999999999999999.0"] {
            let version = VersionCode::from_str_lossy(input);
            assert!(version.is_zero(), "{input} should parse as 0.0.0");
            assert_eq!(version.parts().len(), 3);
        }
    }

    #[test]
    fn test_ordering() {
        assert!(VersionCode::from_str_lossy("2.0.0") > VersionCode::from_str_lossy("1.9.9"));
        assert!(VersionCode::from_str_lossy("v1.10.0") > VersionCode::from_str_lossy("1.9.0"));
        assert!(VersionCode::from_str_lossy("abc") < VersionCode::from_str_lossy("0.0.1"));
        assert_eq!(
            VersionCode::from_str_lossy("1.2"),
            VersionCode::from_str_lossy("1.2.0")
        );
        assert!(VersionCode::from_str_lossy("1.2.0") >= VersionCode::from_str_lossy("1.2"));
    }

    #[test]
    fn test_ordering_longer_tuples() {
        assert_eq!(
            VersionCode::from_str_lossy("1.2.3.0"),
            VersionCode::from_str_lossy("1.2.3")
        );
        assert!(VersionCode::from_str_lossy("1.2.3.1") > VersionCode::from_str_lossy("1.2.3"));
        assert!(VersionCode::from_str_lossy("1.2.2.9") < VersionCode::from_str_lossy("1.2.3"));
    }

    #[test]
    fn test_display() {
        assert_eq!(VersionCode::from_str_lossy("v1.1").to_string(), "1.1.0");
        assert_eq!(VersionCode::from((2, 0, 5)).to_string(), "2.0.5");
    }
}
