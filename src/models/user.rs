use serde::{Deserialize, Serialize};

/// User record stored in redb
/// Uses Unix timestamps (seconds) for compact storage with bincode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub name: String,
    /// Lowercased email, also keyed in the USERS_BY_EMAIL index
    pub email: String,
    /// Argon2 PHC string
    pub password_hash: String,
    /// Pro tier flag; true exempts the user from the daily scan quota
    pub is_pro: bool,
    /// "free" or "pro"
    pub subscription_plan: String,
    /// "none", "active" or "cancelled"
    pub subscription_status: String,
    pub subscription_started_at: Option<i64>,
    /// Gateway references from the upgrade that made the user Pro
    pub payment_id: Option<String>,
    pub order_id: Option<String>,
    pub created_at: i64,
    pub last_login: i64,
    /// Every successful upgrade, newest last
    pub payment_history: Vec<PaymentEntry>,
}

/// One completed payment, kept on the user record for the history endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentEntry {
    #[serde(rename = "paymentId")]
    pub payment_id: String,
    #[serde(rename = "orderId")]
    pub order_id: Option<String>,
    pub plan: String,
    /// Unix seconds
    pub date: i64,
}

impl UserRecord {
    /// Create a fresh free-tier user
    pub fn new(name: String, email: String, password_hash: String, now: i64) -> Self {
        Self {
            name,
            email,
            password_hash,
            is_pro: false,
            subscription_plan: "free".to_string(),
            subscription_status: "none".to_string(),
            subscription_started_at: None,
            payment_id: None,
            order_id: None,
            created_at: now,
            last_login: now,
            payment_history: Vec::new(),
        }
    }

    /// Mark the user as Pro after a verified payment
    pub fn upgrade(&mut self, payment_id: String, order_id: Option<String>, now: i64) {
        self.is_pro = true;
        self.subscription_plan = "pro".to_string();
        self.subscription_status = "active".to_string();
        self.subscription_started_at = Some(now);
        self.payment_id = Some(payment_id.clone());
        if order_id.is_some() {
            self.order_id = order_id.clone();
        }
        self.payment_history.push(PaymentEntry {
            payment_id,
            order_id,
            plan: "pro".to_string(),
            date: now,
        });
    }

    /// Revoke Pro access (refund processed)
    pub fn downgrade(&mut self) {
        self.is_pro = false;
        self.subscription_status = "cancelled".to_string();
    }
}

/// Sanitized user view for API responses (never carries the password hash)
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(rename = "isPro")]
    pub is_pro: bool,
    #[serde(rename = "subscriptionPlan")]
    pub subscription_plan: String,
    #[serde(rename = "subscriptionStatus")]
    pub subscription_status: String,
    #[serde(rename = "createdAt")]
    pub created_at: i64,
    #[serde(rename = "lastLogin")]
    pub last_login: i64,
}

impl UserProfile {
    pub fn from_record(id: &str, record: &UserRecord) -> Self {
        Self {
            id: id.to_string(),
            name: record.name.clone(),
            email: record.email.clone(),
            is_pro: record.is_pro,
            subscription_plan: record.subscription_plan.clone(),
            subscription_status: record.subscription_status.clone(),
            created_at: record.created_at,
            last_login: record.last_login,
        }
    }
}

/// Cheap email shape check; real validation happens when mail bounces
pub fn validate_email(email: &str) -> bool {
    let email = email.trim();
    if email.len() < 6 || email.len() > 254 {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    }
}
