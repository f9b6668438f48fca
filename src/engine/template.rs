use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ============================================================================
// Message Templates - Intent Keys and Template Resolution
// ============================================================================
//
// Every notification the engine can send is identified by a MessageKind.
// The template store maps each kind to an editable template; a custom
// override wins over the built-in default when present and non-empty.
//
// Resolution fails closed: a missing definition yields a visibly flagged
// error string instead of silently sending blank content. That is a
// configuration bug the operator needs to see in the rendered output.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    NewOrderInitial,
    ConfirmationReminder,
    ProcessingConfirmed,
    DispatchNotification,
    CancellationNotice,
    ShipmentPickedUp,
    InTransitUpdate,
    OutForDelivery,
    AddressNeeded,
    PremisesClosed,
    DeliveredThankYou,
    GenericCourierUpdate,
    ManualStatusChange,
}

impl MessageKind {
    pub const ALL: [MessageKind; 13] = [
        MessageKind::NewOrderInitial,
        MessageKind::ConfirmationReminder,
        MessageKind::ProcessingConfirmed,
        MessageKind::DispatchNotification,
        MessageKind::CancellationNotice,
        MessageKind::ShipmentPickedUp,
        MessageKind::InTransitUpdate,
        MessageKind::OutForDelivery,
        MessageKind::AddressNeeded,
        MessageKind::PremisesClosed,
        MessageKind::DeliveredThankYou,
        MessageKind::GenericCourierUpdate,
        MessageKind::ManualStatusChange,
    ];

    /// Stable key used in logs, metrics labels and the template settings UI.
    pub fn key(&self) -> &'static str {
        match self {
            MessageKind::NewOrderInitial => "NEW_ORDER_INITIAL",
            MessageKind::ConfirmationReminder => "ORDER_CONFIRMATION_REMINDER",
            MessageKind::ProcessingConfirmed => "ORDER_PROCESSING_CONFIRMED",
            MessageKind::DispatchNotification => "ORDER_DISPATCH",
            MessageKind::CancellationNotice => "ORDER_CANCELLED",
            MessageKind::ShipmentPickedUp => "COURIER_SHIPMENT_PICKED_UP",
            MessageKind::InTransitUpdate => "COURIER_IN_TRANSIT_UPDATE",
            MessageKind::OutForDelivery => "COURIER_OUT_FOR_DELIVERY",
            MessageKind::AddressNeeded => "COURIER_ADDRESS_NEEDED",
            MessageKind::PremisesClosed => "COURIER_RECIPIENT_PREMISES_CLOSED",
            MessageKind::DeliveredThankYou => "COURIER_DELIVERED_THANK_YOU",
            MessageKind::GenericCourierUpdate => "COURIER_GENERIC_UPDATE",
            MessageKind::ManualStatusChange => "MANUAL_STATUS_CHANGE_NOTIFICATION",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Editable template definition as stored in the settings workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateDefinition {
    pub display_name: String,
    pub template: String,
    pub description: String,
    pub placeholders: Vec<String>,
}

/// Outcome of template resolution, ready for placeholder rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTemplate {
    pub display_name: String,
    pub template: String,
}

/// Read side of the template settings. The engine only reads; writes happen
/// in the external settings workflow through `set_override`.
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    defaults: HashMap<MessageKind, TemplateDefinition>,
    overrides: HashMap<MessageKind, TemplateDefinition>,
}

impl TemplateStore {
    /// Store carrying the built-in default for every message kind.
    pub fn with_defaults() -> Self {
        let mut defaults = HashMap::new();
        for kind in MessageKind::ALL {
            defaults.insert(kind, default_definition(kind));
        }
        Self {
            defaults,
            overrides: HashMap::new(),
        }
    }

    /// Empty store, only useful for exercising the fail-closed path.
    #[cfg(test)]
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn set_override(&mut self, kind: MessageKind, definition: TemplateDefinition) {
        self.overrides.insert(kind, definition);
    }

    pub fn definition(&self, kind: MessageKind) -> Option<&TemplateDefinition> {
        self.overrides
            .get(&kind)
            .filter(|d| !d.template.trim().is_empty())
            .or_else(|| self.defaults.get(&kind))
    }

    pub fn resolve(&self, kind: MessageKind) -> ResolvedTemplate {
        match self.definition(kind) {
            Some(def) if !def.template.trim().is_empty() => ResolvedTemplate {
                display_name: def.display_name.clone(),
                template: def.template.clone(),
            },
            _ => ResolvedTemplate {
                display_name: format!("Missing Template ({})", kind.key()),
                template: format!("[TEMPLATE MISSING: {}]", kind.key()),
            },
        }
    }
}

// ============================================================================
// Built-in Defaults
// ============================================================================

fn common_placeholders() -> Vec<String> {
    [
        "{{customerName}}",
        "{{orderId}}",
        "{{itemsList}}",
        "{{totalAmount}}",
        "{{address}}",
        "{{city}}",
        "{{phoneNumber}}",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn tracking_placeholders() -> Vec<String> {
    let mut v = common_placeholders();
    v.push("{{trackingNumber}}".to_string());
    v.push("{{trackingLink}}".to_string());
    v
}

fn courier_status_placeholders() -> Vec<String> {
    let mut v = tracking_placeholders();
    v.push("{{latestCourierStatus}}".to_string());
    v
}

fn new_order_placeholders() -> Vec<String> {
    let mut v = common_placeholders();
    v.extend(
        [
            "{{advancePaymentPrice}}",
            "{{paymentAccountNumber}}",
            "{{paymentAccountName}}",
            "{{discountPercentage}}",
        ]
        .iter()
        .map(|s| s.to_string()),
    );
    v
}

fn default_definition(kind: MessageKind) -> TemplateDefinition {
    let (display_name, description, placeholders, template): (&str, &str, Vec<String>, String) =
        match kind {
            MessageKind::NewOrderInitial => (
                "Initial New Order Notification",
                "Sent when a new order is created. Includes payment options and the advance-payment discount.",
                new_order_placeholders(),
                new_order_template(),
            ),
            MessageKind::ConfirmationReminder => (
                "Order Confirmation Reminder",
                "Sent if the customer has not confirmed the order after the configured delay.",
                common_placeholders(),
                confirmation_reminder_template(),
            ),
            MessageKind::ProcessingConfirmed => (
                "Order Processing Confirmed",
                "Sent after the customer confirms the order, before dispatch.",
                common_placeholders(),
                processing_confirmed_template(),
            ),
            MessageKind::DispatchNotification => (
                "Order Dispatch Notification",
                "Sent when an order is dispatched. Includes tracking information.",
                tracking_placeholders(),
                dispatch_template(),
            ),
            MessageKind::CancellationNotice => (
                "Order Cancellation Notification",
                "Sent when an order is cancelled.",
                common_placeholders(),
                cancellation_template(),
            ),
            MessageKind::ShipmentPickedUp => (
                "Courier: Shipment Picked Up",
                "Sent when the courier has picked up the shipment.",
                courier_status_placeholders(),
                picked_up_template(),
            ),
            MessageKind::InTransitUpdate => (
                "Courier: In Transit Update",
                "Sent for generic in-transit updates from the courier.",
                courier_status_placeholders(),
                in_transit_template(),
            ),
            MessageKind::OutForDelivery => (
                "Courier: Out for Delivery",
                "Sent when the courier status indicates the parcel is out for delivery.",
                tracking_placeholders(),
                out_for_delivery_template(),
            ),
            MessageKind::AddressNeeded => (
                "Courier: Address Information Needed",
                "Sent when the courier needs more address information.",
                tracking_placeholders(),
                address_needed_template(),
            ),
            MessageKind::PremisesClosed => (
                "Courier: Recipient Premises Closed",
                "Sent when a delivery attempt failed because the premises were closed.",
                courier_status_placeholders(),
                premises_closed_template(),
            ),
            MessageKind::DeliveredThankYou => (
                "Order Delivered - Thank You",
                "Sent after successful delivery to thank the customer and ask for feedback.",
                tracking_placeholders(),
                thank_you_template(),
            ),
            MessageKind::GenericCourierUpdate => (
                "Courier: Generic Status Update",
                "Sent for courier updates without a more specific message kind.",
                courier_status_placeholders(),
                generic_update_template(),
            ),
            MessageKind::ManualStatusChange => (
                "Manual Order Status Change",
                "Generic notification sent when an order's status is changed manually.",
                vec![
                    "{{customerName}}".to_string(),
                    "{{orderId}}".to_string(),
                    "{{appStatus}}".to_string(),
                ],
                manual_status_template(),
            ),
        };

    TemplateDefinition {
        display_name: display_name.to_string(),
        template,
        description: description.to_string(),
        placeholders,
    }
}

fn new_order_template() -> String {
    "\u{1F389} *Aapka Order Confirm Hogaya Hai!* \u{1F389}\n\n\
     Assalam-o-Alaikum {{customerName}},\n\
     Aap ka order ID {{orderId}} humain mosool ho gaya hai. Hum jald hi isay process karain gey.\n\n\
     \u{1F4CD} *Delivery Address:*\n{{address}}, {{city}}\n\n\
     \u{1F4E6} *Order Tafseelat:*\n{{itemsList}}\n\n\
     \u{1F4B0} *Payment Options:*\n\
     1. *Cash on Delivery (COD):* {{totalAmount}}\n\
     2. *Advance Payment ({{discountPercentage}}% Discount):* {{advancePaymentPrice}}\n\n\
     Agar aap {{discountPercentage}}% discount hasil karna chahte hain, to {{advancePaymentPrice}} neeche diye gaye account par bhaijain:\n\n\
     *Payment Account:*\n\
     Account Number: {{paymentAccountNumber}}\n\
     Account Name: {{paymentAccountName}}\n\n\
     Payment ke baad, transaction ka screenshot isi number par WhatsApp karain. Aap ka order discount ke sath confirm hojayega.\n\n\
     Shukriya! \u{1F60A}"
        .to_string()
}

fn confirmation_reminder_template() -> String {
    "\u{1F4E2} *Order Confirmation Reminder*\n\n\
     Assalam-o-Alaikum {{customerName}},\n\
     Yeh message aap ke order ID {{orderId}} ki confirmation ke liye hai.\n\n\
     Barah-e-karam, apna order confirm karne ke liye is message ka jawab *'Yes'* likh kar dain.\n\n\
     Agar aap order cancel karna chahte hain ya koi tabdeeli darkaar hai, to woh bhi humain batayen.\n\n\
     Shukriya."
        .to_string()
}

fn processing_confirmed_template() -> String {
    "\u{2705} *Order Confirmed & Processing Shuru!* \u{2705}\n\n\
     Assalam-o-Alaikum {{customerName}},\n\
     Aap ka order ID {{orderId}} confirm ho chuka hai aur ab processing mein hai. Hum jald hi isay dispatch karne ki koshish karenge.\n\n\
     Order Tafseelat:\n{{itemsList}}\n\
     Total Amount: {{totalAmount}}\n\n\
     Dispatch ki ittila aap ko jald di jayegi.\n\n\
     Shukriya!"
        .to_string()
}

fn dispatch_template() -> String {
    "\u{1F69A} *Aapka Order Dispatch Hogaya Hai!* \u{1F4E6}\n\n\
     Assalam-o-Alaikum {{customerName}},\n\
     Khushkhabri! Aap ka order ID {{orderId}} dispatch kar diya gaya hai aur jald hi aap ko mosool ho jaye ga.\n\n\
     \u{1F4CD} *Delivery Address:*\n{{address}}, {{city}}\n\n\
     \u{1F4E6} *Order Tafseelat:*\n{{itemsList}}\n\n\
     *Tracking Information:*\n\
     Tracking ID (CN): *{{trackingNumber}}*\n\
     Aap apna parcel yahan track kar sakte hain:\n{{trackingLink}}\n\n\
     Barah-e-karam apna phone on rakhein takay delivery associate aap se rabta kar sakay.\n\
     Delivery ke waqt COD amount tayyar rakhein (agar lagu ho).\n\n\
     Shukriya! \u{1F60A}"
        .to_string()
}

fn cancellation_template() -> String {
    "\u{274C} *Order Cancellation Ittila* \u{274C}\n\n\
     Assalam-o-Alaikum {{customerName}},\n\
     Afsos ke sath aap ko ittila di jati hai ke aap ka order ID {{orderId}} cancel kar diya gaya hai.\n\n\
     Items:\n{{itemsList}}\n\n\
     Agar aap ne koi advance payment ki thi, to aap ka refund 24-48 working hours mein process kar diya jaye ga.\n\n\
     Kisi bhi pareshani ke liye hum mazrat khwaah hain.\n\n\
     Shukriya."
        .to_string()
}

fn picked_up_template() -> String {
    "\u{1F4E6} *Shipment Courier Ne Pick Kar Liya Hai!*\n\n\
     Assalam-o-Alaikum {{customerName}},\n\
     Aap ka order ID {{orderId}} (Tracking #: {{trackingNumber}}) courier ne pick kar liya hai aur ab yeh \"{{latestCourierStatus}}\" status mein hai.\n\n\
     Aap apni shipment yahan track kar sakte hain: {{trackingLink}}\n\n\
     Shukriya."
        .to_string()
}

fn in_transit_template() -> String {
    "\u{2708} *Shipment Raastay Mein Hai!* \u{2708}\n\n\
     Assalam-o-Alaikum {{customerName}},\n\
     Aap ka order ID {{orderId}} (Tracking #: {{trackingNumber}}) ab 'In Transit' hai. Status: {{latestCourierStatus}}.\n\n\
     Delivery ki expected date jald update ki jayegi. Tracking Link: {{trackingLink}}\n\n\
     Shukriya."
        .to_string()
}

fn out_for_delivery_template() -> String {
    "\u{1F6F5} *Parcel Delivery Ke Liye Nikal Chuka Hai!* \u{1F6F5}\n\n\
     Assalam-o-Alaikum {{customerName}},\n\
     Aap ka order ID {{orderId}} (Tracking #: {{trackingNumber}}) aaj delivery ke liye nikal chuka hai.\n\n\
     Delivery rider jald hi aap se rabta karega. Barah-e-karam apna phone on rakhein aur COD amount (agar ho) tayyar rakhein.\n\n\
     Tracking Link: {{trackingLink}}\n\n\
     Shukriya."
        .to_string()
}

fn address_needed_template() -> String {
    "\u{26A0} *Address Ki Maloomat Darkaar Hain!* \u{26A0}\n\n\
     Assalam-o-Alaikum {{customerName}},\n\
     Aap ke order ID {{orderId}} (Tracking #: {{trackingNumber}}) ki delivery ke liye courier company ko aap ke address ki mazeed/mukammal tafseel darkaar hai.\n\n\
     Barah-e-karam, apna *mukammal address* (Makan No, Gali No, Sector/Block, qareebi nishani, aur shehar) is message ke jawab mein jald az jald faraham karein takay aap ka parcel bina kisi takheer ke deliver ho sakay.\n\n\
     Aap ke taawun ka shukriya."
        .to_string()
}

fn premises_closed_template() -> String {
    "\u{26A0} *Delivery Attempt - Maqam Band Tha* \u{26A0}\n\n\
     Assalam-o-Alaikum {{customerName}},\n\
     Aap ke order ID {{orderId}} (Tracking #: {{trackingNumber}}) ki delivery ki koshish ki gayi thi, lekin maqam band honay ki wajah se deliver nahi ho saka. Status: {{latestCourierStatus}}.\n\n\
     Courier company jald hi dobara delivery ki koshish karegi. Agar aap kal available nahi hain, to barah-e-karam humein inform karein.\n\n\
     Tracking Link: {{trackingLink}}\n\n\
     Shukriya."
        .to_string()
}

fn thank_you_template() -> String {
    "\u{1F31F} *Order Delivered - Aapka Bohat Shukriya!* \u{1F31F}\n\n\
     Assalam-o-Alaikum {{customerName}},\n\
     Humein khushi hai ke aap ka order ID {{orderId}} kamyaabi se deliver ho gaya hai!\n\n\
     Umeed hai aap apni kharidari se mutmain honge. Agar aap ka koi feedback ya tajweez ho, to zaroor humaray saath share karein.\n\n\
     Stay Blessed! \u{1F60A}"
        .to_string()
}

fn generic_update_template() -> String {
    "\u{2139} *Order Status Update*\n\n\
     Assalam-o-Alaikum {{customerName}},\n\
     Aapkay order ID {{orderId}} (Tracking #: {{trackingNumber}}) ka status ab \"{{latestCourierStatus}}\" hai.\n\n\
     Tafseelat ke liye, aap tracking link istemal kar sakte hain: {{trackingLink}}\n\n\
     Shukriya."
        .to_string()
}

fn manual_status_template() -> String {
    "\u{1F4E2} *Order Update*\n\n\
     Assalam-o-Alaikum {{customerName}},\n\
     Aap ke order ID {{orderId}} ka status update ho kar \"{{appStatus}}\" kar diya gaya hai.\n\n\
     Agar aap ke koi sawalat hon, to aap hum se rabta kar sakte hain.\n\n\
     Shukriya."
        .to_string()
}

// ============================================================================
// Unit Tests
// ============================================================================
