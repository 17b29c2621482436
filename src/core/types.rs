use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Document,
    Canvas,
    Frame,
    Group,
    Section,
    Rectangle,
    Instance,
    Component,
    ComponentSet,
    Text,
    Vector,
    Ellipse,
    Unknown,
}

impl NodeType {
    pub fn from_str(raw: &str) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "DOCUMENT" => Self::Document,
            "CANVAS" => Self::Canvas,
            "FRAME" => Self::Frame,
            "GROUP" => Self::Group,
            "SECTION" => Self::Section,
            "RECTANGLE" => Self::Rectangle,
            "INSTANCE" => Self::Instance,
            "COMPONENT" => Self::Component,
            "COMPONENT_SET" => Self::ComponentSet,
            "TEXT" => Self::Text,
            "VECTOR" => Self::Vector,
            "ELLIPSE" => Self::Ellipse,
            _ => Self::Unknown,
        }
    }

    /// Node types whose own fills may carry goal artwork.
    pub fn can_hold_image(self) -> bool {
        matches!(
            self,
            Self::Rectangle | Self::Frame | Self::Instance | Self::Component
        )
    }
}

impl From<String> for NodeType {
    fn from(value: String) -> Self {
        Self::from_str(&value)
    }
}

impl<'de> Deserialize<'de> for NodeType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Self::from)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintType {
    Solid,
    Image,
    Gradient,
    Unknown,
}

impl PaintType {
    pub fn from_str(raw: &str) -> Self {
        let upper = raw.to_ascii_uppercase();
        match upper.as_str() {
            "SOLID" => Self::Solid,
            "IMAGE" => Self::Image,
            _ if upper.starts_with("GRADIENT_") => Self::Gradient,
            _ => Self::Unknown,
        }
    }
}

impl<'de> Deserialize<'de> for PaintType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer).map(|raw| Self::from_str(&raw))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paint {
    #[serde(rename = "type")]
    pub paint_type: PaintType,
    #[serde(default)]
    pub image_ref: Option<String>,
}

/// Axis-aligned rectangle in design-space units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// One node of the design document tree, borrowed read-only by every
/// traversal once deserialized.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentNode {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default)]
    pub characters: Option<String>,
    #[serde(default)]
    pub absolute_bounding_box: Option<BoundingBox>,
    #[serde(default)]
    pub fills: Vec<Paint>,
    #[serde(default)]
    pub children: Vec<DocumentNode>,
}

/// What the extractor cares about for a single node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole<'a> {
    Text { characters: &'a str },
    ImageContainer { image_ref: &'a str },
    Container,
    Ignored,
}

impl DocumentNode {
    pub fn role(&self) -> NodeRole<'_> {
        match self.node_type {
            NodeType::Text => match self.characters.as_deref() {
                Some(characters) => NodeRole::Text { characters },
                None => NodeRole::Ignored,
            },
            kind if kind.can_hold_image() => match self.first_image_ref() {
                Some(image_ref) => NodeRole::ImageContainer { image_ref },
                None if kind == NodeType::Rectangle => NodeRole::Ignored,
                None => NodeRole::Container,
            },
            NodeType::Document
            | NodeType::Canvas
            | NodeType::Group
            | NodeType::Section
            | NodeType::ComponentSet => NodeRole::Container,
            _ => NodeRole::Ignored,
        }
    }

    /// Image reference of the first IMAGE-type fill, when it is non-empty.
    /// Later image fills are never consulted.
    pub fn first_image_ref(&self) -> Option<&str> {
        self.fills
            .iter()
            .find(|paint| paint.paint_type == PaintType::Image)
            .and_then(|paint| paint.image_ref.as_deref())
            .filter(|image_ref| !image_ref.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextCandidate {
    pub node_id: String,
    pub text: String,
    pub bbox: BoundingBox,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageCandidate {
    pub node_id: String,
    pub bbox: BoundingBox,
}

/// Image node id → caption, in insertion order.
pub type MatchMap = IndexMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchPolicy {
    #[default]
    FirstWins,
    LastWins,
}

impl MatchPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstWins => "first",
            Self::LastWins => "last",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFormat {
    #[default]
    Png,
    Jpg,
    Svg,
    Pdf,
}

impl ImageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpg => "jpg",
            Self::Svg => "svg",
            Self::Pdf => "pdf",
        }
    }

    pub fn extension(&self) -> &'static str {
        self.as_str()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub matched: usize,
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
}
