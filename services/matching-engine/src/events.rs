//! Audit records emitted by the engine
//!
//! Every committed operation produces a fixed set of records, delivered to
//! an [`EventSink`] before the operation returns. A failed operation emits
//! nothing.

use serde::{Deserialize, Serialize};
use types::ids::{MarketId, OrderId, ParticipantId};
use types::numeric::Price;
use types::outcome::{Outcome, Side};

/// One audit record
///
/// `SharesTransferred.from` is `None` when the shares are freshly minted
/// rather than moved from another holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketEvent {
    MarketCreated {
        market: MarketId,
    },
    MarketResolved {
        market: MarketId,
        outcome: Outcome,
    },
    LimitOrderPlaced {
        market: MarketId,
        maker: ParticipantId,
        order_id: OrderId,
        price: Price,
        size: u128,
        outcome: Outcome,
        side: Side,
    },
    MarketOrderExecuted {
        market: MarketId,
        taker: ParticipantId,
        fulfilled: u128,
        outcome: Outcome,
        side: Side,
    },
    OrderFilled {
        market: MarketId,
        maker: ParticipantId,
        order_id: OrderId,
        size: u128,
        taker: ParticipantId,
    },
    PriceLevelCleared {
        market: MarketId,
        price: Price,
        outcome: Outcome,
    },
    SharesTransferred {
        market: MarketId,
        from: Option<ParticipantId>,
        to: ParticipantId,
        amount: u128,
        outcome: Outcome,
    },
    OrderCancelled {
        market: MarketId,
        maker: ParticipantId,
        order_id: OrderId,
    },
    RewardsClaimed {
        market: MarketId,
        user: ParticipantId,
        amount: u128,
    },
}

/// Consumes the engine's audit records
pub trait EventSink {
    fn record(&mut self, event: MarketEvent);
}

/// Buffers every record, for assertions and journaling
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Vec<MarketEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[MarketEvent] {
        &self.events
    }

    /// Drain the buffer, returning everything recorded so far
    pub fn take(&mut self) -> Vec<MarketEvent> {
        std::mem::take(&mut self.events)
    }
}

impl EventSink for RecordingSink {
    fn record(&mut self, event: MarketEvent) {
        self.events.push(event);
    }
}

/// Discards every record
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&mut self, _event: MarketEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink_buffers_in_order() {
        let mut sink = RecordingSink::new();
        sink.record(MarketEvent::MarketCreated {
            market: MarketId::new(0),
        });
        sink.record(MarketEvent::MarketResolved {
            market: MarketId::new(0),
            outcome: Outcome::Yes,
        });

        assert_eq!(sink.events().len(), 2);
        let drained = sink.take();
        assert_eq!(drained.len(), 2);
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_event_serialization_tags() {
        let event = MarketEvent::PriceLevelCleared {
            market: MarketId::new(3),
            price: Price::new(500),
            outcome: Outcome::No,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"PRICE_LEVEL_CLEARED\""));
        let decoded: MarketEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, decoded);
    }
}
