//! Matrix State Model
//!
//! In-memory model of the router's crosspoint matrix: the set of sources
//! (inputs), destinations (outputs), their labels, and which source each
//! destination is currently routed from. Numbering is 1-based, as on the
//! router front panel.

use serde::{Deserialize, Serialize};

use crate::hub::messages::{DestinationUpdate, SourceUpdate};
use crate::router::labels::LabelSet;

use super::RouterError;

/// One router input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Source {
    pub id: u16,
    pub label: String,
}

/// One router output and the source currently routed to it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Destination {
    pub id: u16,
    pub label: String,
    /// Id of the source currently routed to this destination
    pub source: u16,
}

/// Full crosspoint state, as served by `GET /v1/matrix`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Matrix {
    pub sources: Vec<Source>,
    pub destinations: Vec<Destination>,
}

impl Matrix {
    /// Build a matrix of the given size with default labels and every
    /// destination parked on source 1.
    pub fn new(inputs: u16, outputs: u16) -> Self {
        let sources = (1..=inputs)
            .map(|id| Source {
                id,
                label: format!("Source {id}"),
            })
            .collect();
        let destinations = (1..=outputs)
            .map(|id| Destination {
                id,
                label: format!("Destination {id}"),
                source: 1,
            })
            .collect();
        Self {
            sources,
            destinations,
        }
    }

    pub fn source(&self, id: u16) -> Option<&Source> {
        self.sources.iter().find(|s| s.id == id)
    }

    pub fn destination(&self, id: u16) -> Option<&Destination> {
        self.destinations.iter().find(|d| d.id == id)
    }

    /// Route `source` to `destination`, returning the resulting update event.
    pub fn set_route(
        &mut self,
        destination: u16,
        source: u16,
    ) -> Result<DestinationUpdate, RouterError> {
        let source_label = self
            .source(source)
            .ok_or(RouterError::UnknownSource(source))?
            .label
            .clone();

        let dest = self
            .destinations
            .iter_mut()
            .find(|d| d.id == destination)
            .ok_or(RouterError::UnknownDestination(destination))?;
        dest.source = source;

        Ok(DestinationUpdate {
            id: dest.id,
            label: dest.label.clone(),
            source: SourceUpdate {
                id: source,
                label: source_label,
            },
        })
    }

    /// Overwrite labels from a parsed label file. Entries for channels the
    /// matrix does not have are ignored.
    pub fn apply_labels(&mut self, labels: &LabelSet) {
        for source in &mut self.sources {
            if let Some(label) = labels.source(source.id) {
                source.label = label.to_string();
            }
        }
        for dest in &mut self.destinations {
            if let Some(label) = labels.destination(dest.id) {
                dest.label = label.to_string();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_matrix_has_default_routing() {
        let matrix = Matrix::new(4, 2);
        assert_eq!(matrix.sources.len(), 4);
        assert_eq!(matrix.destinations.len(), 2);
        assert_eq!(matrix.destination(2).unwrap().source, 1);
        assert_eq!(matrix.source(3).unwrap().label, "Source 3");
    }

    #[test]
    fn set_route_updates_state_and_reports_event() {
        let mut matrix = Matrix::new(4, 4);
        let update = matrix.set_route(2, 3).unwrap();

        assert_eq!(update.id, 2);
        assert_eq!(update.source.id, 3);
        assert_eq!(update.source.label, "Source 3");
        assert_eq!(matrix.destination(2).unwrap().source, 3);
    }

    #[test]
    fn set_route_rejects_unknown_channels() {
        let mut matrix = Matrix::new(2, 2);

        assert!(matches!(
            matrix.set_route(9, 1),
            Err(RouterError::UnknownDestination(9))
        ));
        assert!(matches!(
            matrix.set_route(1, 9),
            Err(RouterError::UnknownSource(9))
        ));
        // Failed attempts leave routing untouched
        assert_eq!(matrix.destination(1).unwrap().source, 1);
    }

    #[test]
    fn apply_labels_skips_out_of_range_entries() {
        let mut matrix = Matrix::new(2, 2);
        let labels = LabelSet::parse("1,CAM 1,MON 1\n5,CAM 5,MON 5\n");

        matrix.apply_labels(&labels);
        assert_eq!(matrix.source(1).unwrap().label, "CAM 1");
        assert_eq!(matrix.destination(1).unwrap().label, "MON 1");
        assert_eq!(matrix.source(2).unwrap().label, "Source 2");
    }
}
