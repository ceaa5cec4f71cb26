use chrono::{NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Single-letter size code the VK API attaches to each resolution/crop
/// of a photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SizeTag {
    #[serde(rename = "w")]
    W,
    #[serde(rename = "z")]
    Z,
    #[serde(rename = "y")]
    Y,
    #[serde(rename = "x")]
    X,
    #[serde(rename = "r")]
    R,
    #[serde(rename = "q")]
    Q,
    #[serde(rename = "p")]
    P,
    #[serde(rename = "o")]
    O,
    #[serde(rename = "m")]
    M,
    #[serde(rename = "s")]
    S,
}

/// Fallback priority when the API reports no pixel dimensions, best first.
pub const FALLBACK_PRIORITY: [SizeTag; 10] = [
    SizeTag::W,
    SizeTag::Z,
    SizeTag::Y,
    SizeTag::X,
    SizeTag::R,
    SizeTag::Q,
    SizeTag::O,
    SizeTag::M,
    SizeTag::P,
    SizeTag::S,
];

impl SizeTag {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "w" => Some(Self::W),
            "z" => Some(Self::Z),
            "y" => Some(Self::Y),
            "x" => Some(Self::X),
            "r" => Some(Self::R),
            "q" => Some(Self::Q),
            "p" => Some(Self::P),
            "o" => Some(Self::O),
            "m" => Some(Self::M),
            "s" => Some(Self::S),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::W => "w",
            Self::Z => "z",
            Self::Y => "y",
            Self::X => "x",
            Self::R => "r",
            Self::Q => "q",
            Self::P => "p",
            Self::O => "o",
            Self::M => "m",
            Self::S => "s",
        }
    }

    /// Reference pixel area of each size class, used to rank variants when
    /// the API omits actual dimensions. The proportioned tags assume the
    /// 2:3 crop of their nominal edge length.
    pub fn reference_area(&self) -> u64 {
        match self {
            Self::W => 2560 * 2048,
            Self::Z => 1080 * 1024,
            Self::Y => 807 * 807 * 2 / 3,
            Self::X => 604 * 604 * 2 / 3,
            Self::R => 510 * 510 * 2 / 3,
            Self::Q => 320 * 320 * 2 / 3,
            Self::P => 200 * 200 * 2 / 3,
            Self::O => 130 * 130 * 2 / 3,
            Self::M => 130 * 130 * 2 / 3,
            Self::S => 75 * 75 * 2 / 3,
        }
    }
}

impl std::fmt::Display for SizeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One available resolution/crop of a photo, in API order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoVariant {
    pub tag: SizeTag,
    pub url: String,
    pub width: u32,
    pub height: u32,
}

impl PhotoVariant {
    /// Declared pixel area; zero when the API omitted dimensions.
    pub fn pixel_area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// A profile photo as returned by `photos.get`, variants kept in API order
/// (not assumed sorted).
#[derive(Debug, Clone)]
pub struct Photo {
    pub id: i64,
    pub likes: u32,
    pub date: NaiveDate,
    pub variants: Vec<PhotoVariant>,
}

#[derive(Debug, Deserialize)]
struct WirePhoto {
    id: i64,
    date: i64,
    #[serde(default)]
    likes: WireLikes,
    #[serde(default)]
    sizes: Vec<WireSize>,
}

#[derive(Debug, Default, Deserialize)]
struct WireLikes {
    count: u32,
}

#[derive(Debug, Deserialize)]
struct WireSize {
    #[serde(rename = "type")]
    tag: String,
    url: String,
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
}

impl Photo {
    fn from_wire(wire: WirePhoto) -> Self {
        let date = Utc
            .timestamp_opt(wire.date, 0)
            .single()
            .unwrap_or_else(|| {
                warn!("Photo {} has an out-of-range date {}", wire.id, wire.date);
                Utc.timestamp_opt(0, 0).unwrap()
            })
            .date_naive();

        let variants = wire
            .sizes
            .into_iter()
            .filter_map(|size| match SizeTag::from_str(&size.tag) {
                Some(tag) => Some(PhotoVariant {
                    tag,
                    url: size.url,
                    width: size.width,
                    height: size.height,
                }),
                None => {
                    tracing::debug!(
                        "Photo {}: ignoring unknown size tag '{}'",
                        wire.id,
                        size.tag
                    );
                    None
                }
            })
            .collect();

        Self {
            id: wire.id,
            likes: wire.likes.count,
            date,
            variants,
        }
    }
}

/// Parse raw `photos.get` items into domain photos.
///
/// Malformed records are skipped with a warning rather than failing the
/// whole batch; the caller sees the loss as `items.len() - result.len()`.
pub fn parse_items(items: &[Value]) -> Vec<Photo> {
    let mut photos = Vec::with_capacity(items.len());
    for item in items {
        match serde_json::from_value::<WirePhoto>(item.clone()) {
            Ok(wire) => photos.push(Photo::from_wire(wire)),
            Err(e) => warn!("Skipping malformed photo record: {}", e),
        }
    }
    photos
}
