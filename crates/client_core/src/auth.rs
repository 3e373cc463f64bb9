use shared::domain::UserId;

/// The signed-in visitor, handed to controllers that need one.
///
/// There is no ambient session: a controller built with `None` treats the
/// visitor as anonymous for its whole lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub user_id: UserId,
    pub display_name: String,
    pub access_token: String,
}

impl CurrentUser {
    pub fn new(
        user_id: UserId,
        display_name: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
            access_token: access_token.into(),
        }
    }
}
