use serde::{Deserialize, Serialize};

/// Unique identifier for a preset in the catalog
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PresetId(pub String);

impl PresetId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parent preset id: everything before the last `/`
    ///
    /// `amenity/cafe/coffee` has parent `amenity/cafe`; a top-level id has none.
    #[must_use]
    pub fn parent(&self) -> Option<PresetId> {
        self.0.rfind('/').map(|idx| PresetId::new(&self.0[..idx]))
    }
}

impl std::fmt::Display for PresetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for PresetId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Geometry class of a mapped feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Geometry {
    /// Standalone node
    Point,
    /// Node that is part of a way
    Vertex,
    /// Open way
    Line,
    /// Closed way or multipolygon
    Area,
    Relation,
}

impl Geometry {
    pub const ALL: [Geometry; 5] = [
        Geometry::Point,
        Geometry::Vertex,
        Geometry::Line,
        Geometry::Area,
        Geometry::Relation,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::Vertex => "vertex",
            Self::Line => "line",
            Self::Area => "area",
            Self::Relation => "relation",
        }
    }

    /// Parse a geometry name, returning `None` for anything unrecognized
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "point" => Some(Self::Point),
            "vertex" => Some(Self::Vertex),
            "line" => Some(Self::Line),
            "area" => Some(Self::Area),
            "relation" => Some(Self::Relation),
            _ => None,
        }
    }

    /// The geometry whose fallback preset covers this one.
    ///
    /// Points and vertices share the `point` fallback, so they are tracked as
    /// one bucket wherever geometry is normalized.
    #[must_use]
    pub fn fallback_geometry(self) -> Self {
        match self {
            Self::Vertex => Self::Point,
            other => other,
        }
    }

    /// Id of the fallback preset for this geometry
    #[must_use]
    pub fn fallback_id(self) -> PresetId {
        PresetId::new(self.fallback_geometry().as_str())
    }
}

impl std::fmt::Display for Geometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for Geometry {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(&s.to_lowercase()).ok_or_else(|| format!("unknown geometry: {s}"))
    }
}

/// Where a ribbon item came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RibbonSource {
    Recent,
    Other,
}
