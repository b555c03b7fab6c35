use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A contact as served by the directory server
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Contact {
    pub id: u64,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub mobile: String,
    pub email: String,
    #[serde(rename = "profilePic", default)]
    pub profile_pic: String,
    #[serde(default)]
    pub favorite: bool,
}

impl Contact {
    /// Display name: first and last name joined by a single space
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Initials for the avatar placeholder (empty names contribute nothing)
    pub fn initials(&self) -> String {
        self.first_name
            .chars()
            .next()
            .into_iter()
            .chain(self.last_name.chars().next())
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct GetContactsResponse {
    pub contacts: Vec<Contact>,
}

#[derive(Debug, Deserialize)]
struct GetContactResponse {
    pub contact: Option<Contact>,
}

#[derive(Clone)]
pub struct DirectoryClient {
    base_url: String,
    client: reqwest::Client,
}

impl DirectoryClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self { base_url, client }
    }

    /// Fetch the full contact list from the directory server
    pub async fn fetch_contacts(&self) -> Result<Vec<Contact>, String> {
        let url = format!("{}/contacts", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| format!("Failed to fetch contacts: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(format!("HTTP {}: {}", status, error_text));
        }

        let result: GetContactsResponse = response
            .json()
            .await
            .map_err(|e| format!("Failed to parse response: {}", e))?;

        Ok(result.contacts)
    }

    /// Fetch one contact by id.
    /// `Ok(None)` means the server answered but carried no contact.
    pub async fn fetch_contact(&self, id: u64) -> Result<Option<Contact>, String> {
        let url = format!("{}/contacts/{}", self.base_url, id);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| format!("Failed to fetch contact {}: {}", id, e))?;

        // An unknown id is an empty payload, not a transport error
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(format!("HTTP {}: {}", status, error_text));
        }

        let result: GetContactResponse = response
            .json()
            .await
            .map_err(|e| format!("Failed to parse response: {}", e))?;

        Ok(result.contact)
    }

    /// Fetch raw profile picture bytes from an absolute URL
    pub async fn fetch_avatar(&self, url: &str) -> Result<Vec<u8>, String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| format!("Failed to fetch avatar: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("HTTP {}", response.status()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| format!("Failed to read avatar bytes: {}", e))?;

        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_contact() {
        let json = r#"{
            "id": 4,
            "firstName": "Ada",
            "lastName": "Lovelace",
            "mobile": "5550100",
            "email": "ada@example.com",
            "profilePic": "https://example.com/ada.png",
            "favorite": true
        }"#;

        let contact: Contact = serde_json::from_str(json).unwrap();
        assert_eq!(contact.id, 4);
        assert_eq!(contact.full_name(), "Ada Lovelace");
        assert_eq!(contact.profile_pic, "https://example.com/ada.png");
        assert!(contact.favorite);
    }

    #[test]
    fn test_parse_contact_with_missing_optional_fields() {
        let json = r#"{
            "id": 9,
            "firstName": "Grace",
            "lastName": "Hopper",
            "mobile": "",
            "email": "grace@example.com"
        }"#;

        let contact: Contact = serde_json::from_str(json).unwrap();
        assert_eq!(contact.profile_pic, "");
        assert!(!contact.favorite);
    }

    #[test]
    fn test_parse_detail_response_with_null_contact() {
        let json = r#"{ "contact": null }"#;
        let response: GetContactResponse = serde_json::from_str(json).unwrap();
        assert!(response.contact.is_none());
    }

    #[test]
    fn test_parse_contacts_response() {
        let json = r#"{ "contacts": [
            { "id": 1, "firstName": "A", "lastName": "B", "mobile": "123", "email": "a@b.com" }
        ] }"#;
        let response: GetContactsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.contacts.len(), 1);
        assert_eq!(response.contacts[0].full_name(), "A B");
    }

    #[test]
    fn test_initials() {
        let contact = Contact {
            id: 1,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            mobile: String::new(),
            email: String::new(),
            profile_pic: String::new(),
            favorite: false,
        };
        assert_eq!(contact.initials(), "AL");

        let nameless = Contact {
            first_name: String::new(),
            last_name: String::new(),
            ..contact
        };
        assert_eq!(nameless.initials(), "");
    }
}
