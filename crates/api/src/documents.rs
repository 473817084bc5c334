//! Query and mutation documents sent to the account service.

use crate::fragment::FieldSelection;
use std::fmt;

/// Operations the service exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `query getUser`
    GetUser,
    /// `query findUsers`
    FindUsers,
    /// `mutation createUser`
    CreateUser,
    /// `mutation updateUser`
    UpdateUser,
    /// `mutation deleteUser`
    DeleteUser,
}

impl Operation {
    /// Every operation.
    pub const ALL: [Self; 5] = [
        Self::GetUser,
        Self::FindUsers,
        Self::CreateUser,
        Self::UpdateUser,
        Self::DeleteUser,
    ];

    /// GraphQL operation name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::GetUser => "getUser",
            Self::FindUsers => "findUsers",
            Self::CreateUser => "createUser",
            Self::UpdateUser => "updateUser",
            Self::DeleteUser => "deleteUser",
        }
    }

    /// Alias the payload is returned under in `data`.
    #[must_use]
    pub const fn result_key(self) -> &'static str {
        match self {
            Self::GetUser | Self::CreateUser | Self::UpdateUser => "user",
            Self::FindUsers => "result",
            Self::DeleteUser => "deleted",
        }
    }

    /// Identify the operation a document runs.
    #[must_use]
    pub fn from_document(document: &str) -> Option<Self> {
        let mut words = document.split_whitespace();
        while let Some(word) = words.next() {
            if word != "query" && word != "mutation" {
                continue;
            }
            let name = words
                .next()
                .and_then(|name| name.split(['(', '{']).next())
                .unwrap_or_default();
            return Self::ALL.into_iter().find(|operation| operation.name() == name);
        }
        None
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.name())
    }
}

/// `getUser` query.
#[must_use]
pub fn get_user(selection: &FieldSelection) -> String {
    format!(
        "query getUser($id: String, $email: String, $username: String) {{
    user: get(id: $id, email: $email, username: $username) {{
        ...UserFields
    }}
}}
{}",
        selection.render()
    )
}

/// `findUsers` query.
#[must_use]
pub fn find_users(selection: &FieldSelection) -> String {
    format!(
        "query findUsers($filters: UserFilterInput!, $pagination: PaginationInput) {{
    result: find(filters: $filters, pagination: $pagination) {{
        docs {{ ...UserFields }},
        total,
        limit,
        page,
        pages,
        offset
    }}
}}
{}",
        selection.render()
    )
}

/// `createUser` mutation.
#[must_use]
pub fn create_user(selection: &FieldSelection) -> String {
    format!(
        "mutation createUser($data: CreateInput!) {{
    user: create(data: $data) {{ ...UserFields }}
}}
{}",
        selection.render()
    )
}

/// `updateUser` mutation.
#[must_use]
pub fn update_user(selection: &FieldSelection) -> String {
    format!(
        "mutation updateUser($id: String!, $data: UpdateInput!) {{
    user: update(id: $id, data: $data) {{ ...UserFields }}
}}
{}",
        selection.render()
    )
}

/// `deleteUser` mutation.
pub const DELETE_USER: &str = "mutation deleteUser($id: String!) {deleted: delete(id: $id)}";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_name_their_operation() {
        let selection = FieldSelection::all();
        let documents = [
            (get_user(&selection), Operation::GetUser),
            (find_users(&selection), Operation::FindUsers),
            (create_user(&selection), Operation::CreateUser),
            (update_user(&selection), Operation::UpdateUser),
            (DELETE_USER.to_owned(), Operation::DeleteUser),
        ];
        for (document, operation) in documents {
            assert_eq!(Operation::from_document(&document), Some(operation));
        }
        assert_eq!(Operation::from_document("query other { x }"), None);
    }

    #[test]
    fn find_selects_page_counters_and_spreads_fragment() {
        let query = find_users(&FieldSelection::all());
        assert!(query.contains("docs { ...UserFields },"));
        assert!(query.contains("fragment UserFields on User"));
        for counter in ["total", "limit", "page", "pages", "offset"] {
            assert!(query.contains(counter));
        }
    }

    #[test]
    fn fragment_is_inserted_once() {
        let query = get_user(&FieldSelection::all());
        assert_eq!(query.matches("fragment UserFields").count(), 1);
    }
}
