//! Shipping address types.

use serde::{Deserialize, Serialize};

use super::id::AddressId;

/// Errors that can occur when changing an [`AddressBook`] selection.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressBookError {
    /// The requested address is not in the book.
    #[error("address {0} is not in the address book")]
    UnknownAddress(AddressId),
}

/// A saved shipping address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Unique address identifier.
    #[serde(rename = "_id")]
    pub id: AddressId,
    /// Free-text address.
    pub address: String,
}

/// A user's saved addresses plus the one chosen for shipping.
///
/// The backend owns the list of addresses; the selection is local state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressBook {
    all: Vec<Address>,
    selected: Option<AddressId>,
}

impl AddressBook {
    /// Create an address book with nothing selected.
    #[must_use]
    pub fn new(all: Vec<Address>) -> Self {
        Self {
            all,
            selected: None,
        }
    }

    /// Create an address book with an explicit selection.
    ///
    /// The selection is taken as-is, even if it does not match any address.
    #[must_use]
    pub fn with_selection(all: Vec<Address>, selected: Option<AddressId>) -> Self {
        Self { all, selected }
    }

    /// All saved addresses.
    #[must_use]
    pub fn all(&self) -> &[Address] {
        &self.all
    }

    /// The selected address ID, if any.
    #[must_use]
    pub const fn selected(&self) -> Option<&AddressId> {
        self.selected.as_ref()
    }

    /// The selected address, if it is present in the book.
    #[must_use]
    pub fn selected_address(&self) -> Option<&Address> {
        let selected = self.selected.as_ref()?;
        self.all.iter().find(|a| &a.id == selected)
    }

    /// Whether the book has no addresses.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// Select an address for shipping.
    ///
    /// # Errors
    ///
    /// Returns [`AddressBookError::UnknownAddress`] if `id` is not in the book.
    pub fn select(&mut self, id: &AddressId) -> Result<(), AddressBookError> {
        if !self.all.iter().any(|a| &a.id == id) {
            return Err(AddressBookError::UnknownAddress(id.clone()));
        }
        self.selected = Some(id.clone());
        Ok(())
    }

    /// Clear the selection.
    pub fn deselect(&mut self) {
        self.selected = None;
    }

    /// Replace the addresses with the backend's latest list.
    ///
    /// A selection that no longer matches any address is dropped.
    pub fn replace_all(&mut self, all: Vec<Address>) {
        self.all = all;
        if let Some(selected) = &self.selected
            && !self.all.iter().any(|a| &a.id == selected)
        {
            self.selected = None;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn address(id: &str, text: &str) -> Address {
        Address {
            id: AddressId::new(id),
            address: text.to_owned(),
        }
    }

    #[test]
    fn test_address_from_backend_json() {
        let json = r#"[{"_id":"rtmY2ppCpdcDSRFz","address":"No 12, 4th Cross, Bengaluru"}]"#;
        let all: Vec<Address> = serde_json::from_str(json).unwrap();
        assert_eq!(all[0].id.as_str(), "rtmY2ppCpdcDSRFz");
        assert_eq!(all[0].address, "No 12, 4th Cross, Bengaluru");
    }

    #[test]
    fn test_select_known_address() {
        let mut book = AddressBook::new(vec![address("x", "Home")]);
        book.select(&AddressId::new("x")).unwrap();
        assert_eq!(book.selected().map(AddressId::as_str), Some("x"));
        assert_eq!(book.selected_address().unwrap().address, "Home");
    }

    #[test]
    fn test_select_unknown_address_is_rejected() {
        let mut book = AddressBook::new(vec![address("x", "Home")]);
        let err = book.select(&AddressId::new("y")).unwrap_err();
        assert_eq!(err, AddressBookError::UnknownAddress(AddressId::new("y")));
        assert!(book.selected().is_none());
    }

    #[test]
    fn test_replace_all_drops_stale_selection() {
        let mut book = AddressBook::new(vec![address("x", "Home"), address("y", "Work")]);
        book.select(&AddressId::new("x")).unwrap();

        book.replace_all(vec![address("x", "Home"), address("z", "Gym")]);
        assert_eq!(book.selected().map(AddressId::as_str), Some("x"));

        book.replace_all(vec![address("z", "Gym")]);
        assert!(book.selected().is_none());
    }

    #[test]
    fn test_deselect() {
        let mut book = AddressBook::new(vec![address("x", "Home")]);
        book.select(&AddressId::new("x")).unwrap();
        book.deselect();
        assert!(book.selected().is_none());
    }
}
