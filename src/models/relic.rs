use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Number of attribute slots on a relic.
pub const SLOT_COUNT: usize = 3;

/// One relic as scraped from the video: a name plus up to three attribute
/// texts in slot order. Slots keep their position; a slot the OCR pass could
/// not read stays empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relic {
    pub name: String,
    pub slots: [String; SLOT_COUNT],
}

impl Relic {
    pub fn new(name: impl Into<String>, slots: [String; SLOT_COUNT]) -> Self {
        Self {
            name: name.into(),
            slots,
        }
    }

    /// Build from however many slot cells a table row carried.
    pub fn from_cells(name: impl Into<String>, cells: &[String]) -> Self {
        let mut slots: [String; SLOT_COUNT] = Default::default();
        for (slot, cell) in slots.iter_mut().zip(cells) {
            *slot = cell.trim().to_string();
        }
        Self::new(name, slots)
    }

    /// The non-empty attribute texts, in slot order.
    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|s| s.as_str()).filter(|s| !s.is_empty())
    }

    /// Order-independent view of the attributes, for exclusion comparisons.
    pub fn attribute_set(&self) -> AttributeSet {
        AttributeSet::of(self)
    }

    /// Color category derived from the second whitespace token of the name.
    pub fn color(&self) -> Option<RelicColor> {
        RelicColor::of_name(&self.name)
    }
}

/// The full attribute set of a relic, compared order-independently.
///
/// Equality contract: two sets are equal iff they contain the same non-empty
/// attribute texts, regardless of which slots those texts were scraped into.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeSet(BTreeSet<String>);

impl AttributeSet {
    pub fn of(relic: &Relic) -> Self {
        Self(relic.attributes().map(str::to_string).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Raw OCR output for one frame: the four capture regions, untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawObservation {
    pub name: String,
    pub slots: [String; SLOT_COUNT],
}

impl RawObservation {
    pub fn new(
        name: impl Into<String>,
        slot1: impl Into<String>,
        slot2: impl Into<String>,
        slot3: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            slots: [slot1.into(), slot2.into(), slot3.into()],
        }
    }
}

/// Semantic color categories of relics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelicColor {
    Red,
    Yellow,
    Blue,
    Green,
}

impl RelicColor {
    pub const ALL: [RelicColor; 4] = [
        RelicColor::Red,
        RelicColor::Yellow,
        RelicColor::Blue,
        RelicColor::Green,
    ];

    /// Fixed lexical table mapping a name token to its color.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "Burning" => Some(RelicColor::Red),
            "Luminous" => Some(RelicColor::Yellow),
            "Drizzly" => Some(RelicColor::Blue),
            "Tranquil" => Some(RelicColor::Green),
            _ => None,
        }
    }

    /// Second whitespace-delimited token of the relic name, through the table.
    pub fn of_name(name: &str) -> Option<Self> {
        name.split_whitespace().nth(1).and_then(Self::from_token)
    }

    pub fn label(&self) -> &'static str {
        match self {
            RelicColor::Red => "Red",
            RelicColor::Yellow => "Yellow",
            RelicColor::Blue => "Blue",
            RelicColor::Green => "Green",
        }
    }

    /// Swatch the front end paints the column picker with.
    pub fn hex(&self) -> &'static str {
        match self {
            RelicColor::Red => "#ff998b",
            RelicColor::Yellow => "#d1ce2c",
            RelicColor::Blue => "#62aff8",
            RelicColor::Green => "#3eff3e",
        }
    }
}

/// Column color choice: one real category, or the union of all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorFilter {
    /// "White" in the picker: every color bucket at once.
    #[default]
    Any,
    Only(RelicColor),
}

impl ColorFilter {
    pub fn label(&self) -> &'static str {
        match self {
            ColorFilter::Any => "White",
            ColorFilter::Only(c) => c.label(),
        }
    }

    pub fn hex(&self) -> &'static str {
        match self {
            ColorFilter::Any => "#eeeeee",
            ColorFilter::Only(c) => c.hex(),
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "White" | "Any" => Some(ColorFilter::Any),
            "Red" => Some(ColorFilter::Only(RelicColor::Red)),
            "Yellow" => Some(ColorFilter::Only(RelicColor::Yellow)),
            "Blue" => Some(ColorFilter::Only(RelicColor::Blue)),
            "Green" => Some(ColorFilter::Only(RelicColor::Green)),
            _ => None,
        }
    }
}
