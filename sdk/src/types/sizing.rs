//! Market account sizing.
//!
//! The dex program stores its queues and order books in fixed-record
//! accounts. Each account carries a 5-byte head and 7-byte tail padding
//! around a header followed by `length` records, and the padded total must
//! leave the payload 8-byte aligned (`size % 8 == 4`).

use serde::{Deserialize, Serialize};

use crate::error::SdkError;
use crate::programs::MARKET_STATE_SIZE;

/// Head plus tail padding wrapped around every dex account.
pub const ACCOUNT_PADDING: usize = 12;

/// Event queue header size.
pub const EVENT_QUEUE_HEADER_SIZE: usize = 32;
/// Size of a single event.
pub const EVENT_SIZE: usize = 88;

/// Request queue header size.
pub const REQUEST_QUEUE_HEADER_SIZE: usize = 32;
/// Size of a single request.
pub const REQUEST_SIZE: usize = 80;

/// Order book (slab) header size.
pub const ORDERBOOK_HEADER_SIZE: usize = 40;
/// Size of a single slab node.
pub const ORDERBOOK_NODE_SIZE: usize = 72;

/// Minimum event queue length.
pub const MIN_EVENT_QUEUE_LENGTH: u32 = 128;
/// Maximum (and default) event queue length.
pub const MAX_EVENT_QUEUE_LENGTH: u32 = 2978;

/// Minimum request queue length.
pub const MIN_REQUEST_QUEUE_LENGTH: u32 = 1;
/// Maximum (and default) request queue length.
pub const MAX_REQUEST_QUEUE_LENGTH: u32 = 63;

/// Minimum order book length.
pub const MIN_ORDERBOOK_LENGTH: u32 = 201;
/// Maximum (and default) order book length.
pub const MAX_ORDERBOOK_LENGTH: u32 = 909;

/// User-chosen record counts for the market's queue and book accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueLengths {
    /// Number of events the event queue can hold.
    pub event_queue: u32,
    /// Number of requests the request queue can hold.
    pub request_queue: u32,
    /// Number of slab nodes in each of bids and asks.
    pub orderbook: u32,
}

impl Default for QueueLengths {
    fn default() -> Self {
        Self {
            event_queue: MAX_EVENT_QUEUE_LENGTH,
            request_queue: MAX_REQUEST_QUEUE_LENGTH,
            orderbook: MAX_ORDERBOOK_LENGTH,
        }
    }
}

impl QueueLengths {
    /// Creates a new set of lengths.
    #[must_use]
    pub const fn new(event_queue: u32, request_queue: u32, orderbook: u32) -> Self {
        Self {
            event_queue,
            request_queue,
            orderbook,
        }
    }

    /// Smallest lengths the dex program accepts.
    #[must_use]
    pub const fn minimum() -> Self {
        Self::new(
            MIN_EVENT_QUEUE_LENGTH,
            MIN_REQUEST_QUEUE_LENGTH,
            MIN_ORDERBOOK_LENGTH,
        )
    }

    /// Checks every length against its bounds.
    ///
    /// # Errors
    ///
    /// Returns `SdkError::QueueLengthOutOfRange` for the first offending length.
    pub fn validate(&self) -> Result<(), SdkError> {
        check_range(
            "event queue",
            self.event_queue,
            MIN_EVENT_QUEUE_LENGTH,
            MAX_EVENT_QUEUE_LENGTH,
        )?;
        check_range(
            "request queue",
            self.request_queue,
            MIN_REQUEST_QUEUE_LENGTH,
            MAX_REQUEST_QUEUE_LENGTH,
        )?;
        check_range(
            "orderbook",
            self.orderbook,
            MIN_ORDERBOOK_LENGTH,
            MAX_ORDERBOOK_LENGTH,
        )
    }
}

fn check_range(queue: &'static str, value: u32, min: u32, max: u32) -> Result<(), SdkError> {
    if value < min || value > max {
        return Err(SdkError::QueueLengthOutOfRange {
            queue,
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// Byte sizes of the accounts allocated for a new market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketAccountSizes {
    /// Market state account size.
    pub market: usize,
    /// Event queue account size.
    pub event_queue: usize,
    /// Request queue account size.
    pub request_queue: usize,
    /// Size of each order book side (bids and asks).
    pub orderbook: usize,
}

impl MarketAccountSizes {
    /// Computes account sizes for the given lengths.
    ///
    /// # Errors
    ///
    /// Returns an error if any length is outside the dex program's bounds.
    pub fn compute(lengths: &QueueLengths) -> Result<Self, SdkError> {
        lengths.validate()?;

        Ok(Self {
            market: MARKET_STATE_SIZE,
            event_queue: padded_account_size(
                EVENT_QUEUE_HEADER_SIZE,
                EVENT_SIZE,
                lengths.event_queue,
            ),
            request_queue: padded_account_size(
                REQUEST_QUEUE_HEADER_SIZE,
                REQUEST_SIZE,
                lengths.request_queue,
            ),
            orderbook: padded_account_size(
                ORDERBOOK_HEADER_SIZE,
                ORDERBOOK_NODE_SIZE,
                lengths.orderbook,
            ),
        })
    }

    /// Total bytes allocated across all market accounts (both book sides).
    #[must_use]
    pub fn total_bytes(&self) -> usize {
        self.market + self.event_queue + self.request_queue + 2 * self.orderbook
    }
}

/// Size of a dex account holding `length` records after a header.
///
/// Rounds up so the result is congruent to 4 modulo 8.
#[must_use]
pub fn padded_account_size(header_size: usize, record_size: usize, length: u32) -> usize {
    let min_required = ACCOUNT_PADDING + header_size + length as usize * record_size;
    let modulo = min_required % 8;
    if modulo <= 4 {
        min_required + (4 - modulo)
    } else {
        min_required + (8 - modulo + 4)
    }
}
