use std::cmp::Ordering;
use std::fmt;

/// One entry of an `Accept` header, e.g. `application/*;q=0.8`.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRange {
    kind: String,
    subtype: String,
    quality: f32,
}

impl MediaRange {
    pub fn parse(value: &str) -> Option<Self> {
        let mut parts = value.split(';');
        let essence = parts.next()?.trim().to_ascii_lowercase();
        let (kind, subtype) = match essence.as_str() {
            "*" => ("*".to_string(), "*".to_string()),
            _ => {
                let (kind, subtype) = essence.split_once('/')?;
                (kind.trim().to_string(), subtype.trim().to_string())
            }
        };
        if kind.is_empty() || subtype.is_empty() {
            return None;
        }

        let mut quality = 1.0;
        for param in parts {
            if let Some((key, value)) = param.split_once('=') {
                if key.trim().eq_ignore_ascii_case("q") {
                    quality = value.trim().parse::<f32>().unwrap_or(1.0).clamp(0.0, 1.0);
                }
            }
        }

        Some(Self {
            kind,
            subtype,
            quality,
        })
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    pub fn quality(&self) -> f32 {
        self.quality
    }

    /// Whether a concrete content type such as `application/json` falls into
    /// this range. Parameters on the content type are ignored.
    pub fn matches(&self, content_type: &str) -> bool {
        let essence = content_type.split(';').next().unwrap_or_default().trim();
        let Some((kind, subtype)) = essence.split_once('/') else {
            return false;
        };

        if self.kind == "*" {
            return true;
        }
        if !self.kind.eq_ignore_ascii_case(kind) {
            return false;
        }
        self.subtype == "*" || self.subtype.eq_ignore_ascii_case(subtype)
    }
}

impl fmt::Display for MediaRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.subtype)
    }
}

/// Parses an `Accept` header into media ranges, most preferred first.
///
/// Ranges with `q=0` are dropped; ranges of equal quality keep the order in
/// which the client listed them.
pub fn parse_accept(header: &str) -> Vec<MediaRange> {
    let mut ranges: Vec<MediaRange> = header
        .split(',')
        .filter_map(MediaRange::parse)
        .filter(|range| range.quality > 0.0)
        .collect();
    ranges.sort_by(|a, b| b.quality.partial_cmp(&a.quality).unwrap_or(Ordering::Equal));
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accept_orders_by_quality() {
        let ranges = parse_accept("text/html;q=0.5, application/json, */*;q=0.1, image/png;q=0");
        let names: Vec<String> = ranges.iter().map(ToString::to_string).collect();
        assert_eq!(names, vec!["application/json", "text/html", "*/*"]);
        assert_eq!(ranges[1].quality(), 0.5);
    }

    #[test]
    fn test_media_range_matching() {
        let any = MediaRange::parse("*/*").unwrap();
        assert!(any.matches("application/json"));

        let application = MediaRange::parse("application/*").unwrap();
        assert!(application.matches("application/javascript"));
        assert!(!application.matches("text/plain"));

        let json = MediaRange::parse("Application/JSON; charset=utf-8").unwrap();
        assert!(json.matches("application/json; charset=utf-8"));
        assert!(!json.matches("application/xml"));

        assert!(MediaRange::parse("garbage").is_none());
        assert_eq!(MediaRange::parse("*").unwrap().to_string(), "*/*");
    }
}
