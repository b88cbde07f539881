//! Wallet event subscription types

use crate::error::{SdkError, SdkResult};
use crate::memory::GuardedBuffer;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::UnboundedReceiver;

/// Event categories understood by the native `listen_wallet`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WalletEventType {
    ConsolidationRequired = 0,
    LedgerAddressGeneration = 1,
    NewOutput = 2,
    SpentOutput = 3,
    TransactionInclusion = 4,
    TransactionProgress = 5,
}

impl WalletEventType {
    pub const ALL: [WalletEventType; 6] = [
        WalletEventType::ConsolidationRequired,
        WalletEventType::LedgerAddressGeneration,
        WalletEventType::NewOutput,
        WalletEventType::SpentOutput,
        WalletEventType::TransactionInclusion,
        WalletEventType::TransactionProgress,
    ];

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }
}

// The native side encodes event types as bare integers
impl Serialize for WalletEventType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

impl<'de> Deserialize<'de> for WalletEventType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = u8::deserialize(deserializer)?;
        Self::from_code(code)
            .ok_or_else(|| D::Error::custom(format!("unknown wallet event type {}", code)))
    }
}

/// One event as delivered by the native module, held in guarded memory
#[derive(Debug)]
pub struct WalletEvent {
    payload: GuardedBuffer,
}

impl WalletEvent {
    pub(crate) fn new(payload: GuardedBuffer) -> Self {
        Self { payload }
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.payload.as_bytes()
    }

    /// Decode the event document
    pub fn decode<T: DeserializeOwned>(&self) -> SdkResult<T> {
        serde_json::from_slice(self.as_bytes()).map_err(|e| SdkError::Decode(e.to_string()))
    }

    pub fn release(self) {
        self.payload.release();
    }
}

/// Receiving end of a wallet subscription
///
/// The stream ends when the subscription is replaced, the SDK that created it
/// is unloaded, or listeners are cleared.
#[derive(Debug)]
pub struct EventStream {
    receiver: UnboundedReceiver<WalletEvent>,
}

impl EventStream {
    pub(crate) fn new(receiver: UnboundedReceiver<WalletEvent>) -> Self {
        Self { receiver }
    }

    /// Wait for the next event; `None` once the stream has ended
    pub async fn recv(&mut self) -> Option<WalletEvent> {
        self.receiver.recv().await
    }

    /// Blocking variant for non-async callers; must not run inside a runtime
    pub fn blocking_recv(&mut self) -> Option<WalletEvent> {
        self.receiver.blocking_recv()
    }

    /// Next event if one is already queued
    pub fn try_recv(&mut self) -> Option<WalletEvent> {
        match self.receiver.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    pub fn close(&mut self) {
        self.receiver.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_event_types_serialize_as_numbers() {
        let json = serde_json::to_string(&WalletEventType::ALL).unwrap();
        assert_eq!(json, "[0,1,2,3,4,5]");

        let parsed: WalletEventType = serde_json::from_str("4").unwrap();
        assert_eq!(parsed, WalletEventType::TransactionInclusion);
        assert!(serde_json::from_str::<WalletEventType>("6").is_err());
    }

    #[test]
    fn test_event_decode() {
        let event = WalletEvent::new(GuardedBuffer::from_slice(
            br#"{"accountIndex":0,"event":{"type":2}}"#,
        ));
        let value: serde_json::Value = event.decode().unwrap();
        assert_eq!(value["event"]["type"], 2);
    }

    #[test]
    fn test_try_recv_after_sender_dropped() {
        let (sender, receiver) = tokio::sync::mpsc::unbounded_channel();
        let mut stream = EventStream::new(receiver);

        sender
            .send(WalletEvent::new(GuardedBuffer::from_slice(b"{}")))
            .unwrap();
        drop(sender);

        assert!(stream.try_recv().is_some());
        assert!(stream.try_recv().is_none());
    }
}
