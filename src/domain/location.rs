//! Holding location models
//!
//! A work is held at locations in both catalogues. SUDOC locations are
//! identified by an RCR (holder code) inside an ILN (region); Alma
//! locations by a library code and carry the physical items.

use serde::{Deserialize, Serialize};

/// A holding of a work in the union catalogue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    /// ILN the holder belongs to, empty until the fetcher resolves it
    pub region_code: String,

    /// RCR of the holding library
    pub holder_code: String,

    /// Short name of the holding library
    pub display_name: String,

    /// Building or shelving hint, empty when absent
    pub sub_location: String,
}

impl SourceLocation {
    /// Creates a location known only by its holder code
    pub fn new(holder_code: impl Into<String>) -> Self {
        Self {
            region_code: String::new(),
            holder_code: holder_code.into(),
            display_name: String::new(),
            sub_location: String::new(),
        }
    }

    /// Sets the sub-location
    pub fn with_sub_location(mut self, sub_location: impl Into<String>) -> Self {
        self.sub_location = sub_location.into();
        self
    }

    /// Sets the region code and display name
    pub fn with_holder_details(
        mut self,
        region_code: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        self.region_code = region_code.into();
        self.display_name = display_name.into();
        self
    }
}

/// One physical item of an Alma holding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Process type code (`ACQ`, `LOAN`, ... or empty when the item is in place)
    pub process_code: String,

    /// Process type label
    pub process_label: String,

    /// Base status code (`1` in place, `0` not in place)
    pub base_status: String,
}

impl Item {
    /// Creates an item with the given process code
    pub fn new(process_code: impl Into<String>) -> Self {
        Self {
            process_code: process_code.into(),
            process_label: String::new(),
            base_status: String::new(),
        }
    }
}

/// A holding of a work in Alma
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetLocation {
    /// Alma library code
    pub holder_code: String,

    /// Alma library description
    pub holder_name: String,

    /// Location (collection) code inside the library
    pub location_code: String,

    /// Location description
    pub location_name: String,

    /// Call number of the holding
    pub call_number: String,

    /// Whether the holding is suppressed from publishing
    pub suppressed: bool,

    /// Items attached to the holding
    pub items: Vec<Item>,
}

impl TargetLocation {
    /// Returns a builder for constructing a target location
    pub fn builder(holder_code: impl Into<String>) -> TargetLocationBuilder {
        TargetLocationBuilder::new(holder_code)
    }
}

/// Builder for constructing TargetLocation instances
#[derive(Debug)]
pub struct TargetLocationBuilder {
    location: TargetLocation,
}

impl TargetLocationBuilder {
    /// Creates a new builder for the given library code
    pub fn new(holder_code: impl Into<String>) -> Self {
        Self {
            location: TargetLocation {
                holder_code: holder_code.into(),
                holder_name: String::new(),
                location_code: String::new(),
                location_name: String::new(),
                call_number: String::new(),
                suppressed: false,
                items: Vec::new(),
            },
        }
    }

    /// Sets the library description
    pub fn holder_name(mut self, name: impl Into<String>) -> Self {
        self.location.holder_name = name.into();
        self
    }

    /// Sets the location code and description
    pub fn location(mut self, code: impl Into<String>, name: impl Into<String>) -> Self {
        self.location.location_code = code.into();
        self.location.location_name = name.into();
        self
    }

    /// Sets the call number
    pub fn call_number(mut self, call_number: impl Into<String>) -> Self {
        self.location.call_number = call_number.into();
        self
    }

    /// Sets the suppression flag
    pub fn suppressed(mut self, suppressed: bool) -> Self {
        self.location.suppressed = suppressed;
        self
    }

    /// Adds an item
    pub fn item(mut self, item: Item) -> Self {
        self.location.items.push(item);
        self
    }

    /// Builds the location
    pub fn build(self) -> TargetLocation {
        self.location
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_location_builders() {
        let loc = SourceLocation::new("341722102")
            .with_sub_location("BU Lettres")
            .with_holder_details("15", "Montpellier-BU Lettres");
        assert_eq!(loc.holder_code, "341722102");
        assert_eq!(loc.region_code, "15");
        assert_eq!(loc.display_name, "Montpellier-BU Lettres");
        assert_eq!(loc.sub_location, "BU Lettres");
    }

    #[test]
    fn test_target_location_builder() {
        let loc = TargetLocation::builder("LETTRES")
            .holder_name("BU Lettres")
            .location("MAG", "Magasin")
            .call_number("840 HUG")
            .suppressed(true)
            .item(Item::new("ACQ"))
            .build();

        assert_eq!(loc.holder_code, "LETTRES");
        assert_eq!(loc.location_code, "MAG");
        assert_eq!(loc.location_name, "Magasin");
        assert!(loc.suppressed);
        assert_eq!(loc.items.len(), 1);
        assert_eq!(loc.items[0].process_code, "ACQ");
    }
}
