//! Checkout form and its validation.

use crate::checkout::{DeliveryOption, PaymentMethod};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Checkout form as submitted.
///
/// Choice fields stay raw strings so an unknown value can be reported
/// against its field instead of failing the whole request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CheckoutForm {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub delivery_option: String,
    pub payment_method: String,
    pub card_number: String,
    pub card_expiry: String,
    pub card_cvv: String,
}

impl Default for CheckoutForm {
    fn default() -> Self {
        Self {
            full_name: String::new(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            city: String::new(),
            postal_code: String::new(),
            delivery_option: DeliveryOption::default().as_str().to_string(),
            payment_method: PaymentMethod::default().as_str().to_string(),
            card_number: String::new(),
            card_expiry: String::new(),
            card_cvv: String::new(),
        }
    }
}

/// Delivery and payment choices of a form that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutChoices {
    pub delivery: DeliveryOption,
    pub payment: PaymentMethod,
}

impl CheckoutForm {
    /// Parsed delivery option, if recognised.
    pub fn delivery(&self) -> Option<DeliveryOption> {
        DeliveryOption::parse(&self.delivery_option)
    }

    /// Parsed payment method, if recognised.
    pub fn payment(&self) -> Option<PaymentMethod> {
        PaymentMethod::parse(&self.payment_method)
    }

    /// Check every field, collecting all messages.
    pub fn validate(&self) -> Result<CheckoutChoices, FieldErrors> {
        let mut errors = FieldErrors::default();

        require(&mut errors, "fullName", &self.full_name, "Full name is required.");
        if is_blank(&self.email) {
            errors.add("email", "Email is required.");
        } else if !is_email_shaped(&self.email) {
            errors.add("email", "Enter a valid email address.");
        }
        require(&mut errors, "phone", &self.phone, "Phone number is required.");
        require(&mut errors, "address", &self.address, "Address is required.");
        require(&mut errors, "city", &self.city, "City is required.");
        require(&mut errors, "postalCode", &self.postal_code, "Postal code is required.");

        let delivery = self.delivery();
        if delivery.is_none() {
            errors.add("deliveryOption", "Select a delivery option.");
        }
        let payment = self.payment();
        match payment {
            None => errors.add("paymentMethod", "Select a payment method."),
            Some(method) if method.requires_card() => {
                require(&mut errors, "cardNumber", &self.card_number, "Card number is required.");
                require(&mut errors, "cardExpiry", &self.card_expiry, "Expiry date is required.");
                require(&mut errors, "cardCvv", &self.card_cvv, "CVV is required.");
            }
            Some(_) => {}
        }

        match (delivery, payment) {
            (Some(delivery), Some(payment)) if errors.is_empty() => {
                Ok(CheckoutChoices { delivery, payment })
            }
            _ => Err(errors),
        }
    }
}

/// Validation messages keyed by form field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Record a message against `field`.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Messages for one field.
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether `field` has any message.
    pub fn has(&self, field: &str) -> bool {
        !self.get(field).is_empty()
    }

    /// Fields with at least one message.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields with messages.
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

fn require(errors: &mut FieldErrors, field: &str, value: &str, message: &str) {
    if is_blank(value) {
        errors.add(field, message);
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// One `@`, neither leading nor trailing, and no line breaks.
fn is_email_shaped(value: &str) -> bool {
    if value.contains(['\r', '\n']) {
        return false;
    }
    let mut ats = value.match_indices('@');
    match (ats.next(), ats.next()) {
        (Some((index, _)), None) => index > 0 && index < value.len() - 1,
        _ => false,
    }
}
