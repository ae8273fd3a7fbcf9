//! Field accessors for the dashboard's record shapes.
//!
//! Field names are the document-store names, so a filter built from a URL or
//! form value works the same against typed records and raw JSON.

use std::borrow::Cow;

use serde_json::Value;

use rideadmin_common::{BusinessUser, CarouselAd, VehicleVerification};

use crate::filter::Searchable;

fn text(value: &Option<String>) -> Option<Cow<'_, str>> {
    value.as_deref().map(Cow::Borrowed)
}

fn flag(value: bool) -> Option<Cow<'static, str>> {
    Some(Cow::Borrowed(if value { "true" } else { "false" }))
}

impl Searchable for CarouselAd {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            "id" => Some(Cow::Borrowed(self.id.as_str())),
            "title" => Some(Cow::Borrowed(self.title.as_str())),
            "description" => text(&self.description),
            "category" => text(&self.category),
            "type" | "adType" => text(&self.ad_type),
            "status" => text(&self.status),
            "isActive" => flag(self.is_active),
            _ => None,
        }
    }
}

impl Searchable for BusinessUser {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            "id" => Some(Cow::Borrowed(self.id.as_str())),
            "name" => text(&self.name),
            "email" => text(&self.email),
            "phone" => text(&self.phone),
            "businessName" => text(&self.business_name),
            "category" => text(&self.category),
            "status" => text(&self.status),
            "isVerified" => flag(self.is_verified),
            _ => None,
        }
    }
}

impl Searchable for VehicleVerification {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            "id" => Some(Cow::Borrowed(self.id.as_str())),
            "userId" => Some(Cow::Borrowed(self.user_id.as_str())),
            "userName" | "name" => text(&self.user_name),
            "email" => text(&self.email),
            "phone" => text(&self.phone),
            "vehicleNumber" => text(&self.vehicle_number),
            "vehicleType" => text(&self.vehicle_type),
            "status" => Some(Cow::Borrowed(self.status.as_str())),
            _ => None,
        }
    }
}

/// Raw documents. `name` may be a dotted path into nested objects
/// (`"scheduling.enabled"`). Strings are returned as-is, booleans and numbers
/// as their JSON text; null, arrays and objects have no searchable value.
impl Searchable for Value {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        let mut current = self;
        for segment in name.split('.') {
            current = current.as_object()?.get(segment)?;
        }
        match current {
            Value::String(s) => Some(Cow::Borrowed(s.as_str())),
            Value::Bool(b) => flag(*b),
            Value::Number(n) => Some(Cow::Owned(n.to_string())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }
}
