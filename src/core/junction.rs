//! Junction: explizite Spur-zu-Spur-Verknüpfungen zwischen Straßen.

use indexmap::IndexMap;

use crate::core::LaneKey;

/// Kreuzungsknoten des Straßengraphen.
///
/// Hält pro eingehender Spur die Liste der Verbindungsspuren. Die
/// IndexMap bewahrt die Einfügereihenfolge, damit Fan-out-Abfragen
/// reproduzierbare Ergebnislisten liefern.
#[derive(Debug, Clone, Default)]
pub struct Junction {
    pub id: u64,
    connections: IndexMap<LaneKey, Vec<LaneKey>>,
}

impl Junction {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            connections: IndexMap::new(),
        }
    }

    /// Registriert eine Verbindung `(eingehende Spur) → (Verbindungsspur)`.
    pub fn add_connection(&mut self, incoming: LaneKey, connecting: LaneKey) {
        self.connections.entry(incoming).or_default().push(connecting);
    }

    /// Verbindungsspuren für eine eingehende Spur (leer falls keine).
    pub fn connections_from(&self, incoming: LaneKey) -> &[LaneKey] {
        self.connections
            .get(&incoming)
            .map_or(&[], |targets| targets.as_slice())
    }

    /// Alle Verbindungen in Einfügereihenfolge.
    pub fn connections(&self) -> impl Iterator<Item = (&LaneKey, &[LaneKey])> {
        self.connections.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn connection_count(&self) -> usize {
        self.connections.values().map(Vec::len).sum()
    }
}
