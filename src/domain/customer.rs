use serde::{Deserialize, Serialize};

use crate::domain::invoice::DeliveryMethod;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Customer {
	pub id:            String,
	#[serde(skip_serializing_if = "Option::is_none", default)]
	pub email_address: Option<String>,
}

impl Customer {
	pub fn has_email(&self) -> bool {
		self.email_address
			.as_deref()
			.is_some_and(|email| !email.trim().is_empty())
	}

	pub fn delivery_method(&self) -> DeliveryMethod {
		if self.has_email() {
			DeliveryMethod::Email
		} else {
			DeliveryMethod::ShareManually
		}
	}
}
