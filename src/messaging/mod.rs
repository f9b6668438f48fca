// ============================================================================
// Messaging Module
// ============================================================================
//
// Outbound notification delivery. The engine talks to the NotificationSender
// trait; the gateway implementation owns provider plumbing and resilience.
//
// ============================================================================

mod whatsapp;

pub use whatsapp::{NotificationSender, SendReceipt, WhatsAppGateway};
