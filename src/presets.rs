//! Named assistant presets.
//!
//! Each preset is a fixed pairing of a system prompt and a tool flag. They
//! carry no logic of their own; `messages` defers to the same assembly the
//! client uses directly.

use crate::chat::message::{ChatMessage, build_messages};

const GREETING_PROMPT: &str = "You are a friendly assistant. Respond warmly to greetings.";

const WEATHER_PROMPT: &str =
    "You are a weather assistant. You can get the weather for a given city.";

const CUSTOMER_SERVICE_PROMPT: &str = "You are a helpful customer service agent for an online store.
You can help with:
- Order inquiries
- Refund requests
- Product questions
- General support

Be polite, concise, and helpful. Do not answer questions that are not related to the store.
Use the available tools when appropriate.";

const REFUND_PROMPT: &str = "You are a refund processing assistant.
When a customer requests a refund, use the process_refund tool to handle it.";

const PURCHASE_PROMPT: &str = "You are a purchase assistant.
When a customer wants to buy something, use the create_purchase tool to handle it.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Greeting,
    Weather,
    CustomerService,
    Refund,
    Purchase,
}

impl Preset {
    pub const ALL: [Preset; 5] = [
        Preset::Greeting,
        Preset::Weather,
        Preset::CustomerService,
        Preset::Refund,
        Preset::Purchase,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::Weather => "weather",
            Self::CustomerService => "customer-service",
            Self::Refund => "refund",
            Self::Purchase => "purchase",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.as_str() == name)
    }

    /// The literal system prompt this preset prepends.
    pub fn system_prompt(self) -> &'static str {
        match self {
            Self::Greeting => GREETING_PROMPT,
            Self::Weather => WEATHER_PROMPT,
            Self::CustomerService => CUSTOMER_SERVICE_PROMPT,
            Self::Refund => REFUND_PROMPT,
            Self::Purchase => PURCHASE_PROMPT,
        }
    }

    /// Whether the preset advertises the storefront tool list.
    pub fn uses_tools(self) -> bool {
        !matches!(self, Self::Greeting)
    }

    /// Builds the message sequence this preset sends for a user prompt.
    pub fn messages(self, prompt: &str) -> Vec<ChatMessage> {
        build_messages(prompt, Some(self.system_prompt()))
    }
}

/// Formats the refund-analysis prompt embedding an order id and reason.
///
/// The model is asked for a JSON object but the reply is returned as raw
/// text; no parsing or schema validation happens on this side.
pub fn refund_analysis_prompt(order_id: &str, reason: &str) -> String {
    format!(
        "A customer has requested a refund for order {order_id}.\n\
         Stated reason: {reason}\n\n\
         Decide whether the refund should be approved. Respond with a JSON object \
         containing the keys \"approve\" (boolean) and \"explanation\" (string)."
    )
}
