//! Routes and the login gate

use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::products::ProductId;

/// Storefront page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    /// Landing page
    Home,
    /// Catalog listing
    Products,
    /// Single product
    ProductDetail(ProductId),
    /// Cart
    Cart,
    /// Favourites
    Favourites,
    /// Login and signup
    Login,
    /// Checkout form
    Checkout,
    /// Payment gateway
    Payment,
    /// Order confirmation
    PaymentSuccess,
    /// Profile and order history
    Profile,
    /// About page
    About,
    /// Contact page
    Contact,
}

impl Route {
    /// URL path of this page.
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Products => "/products".to_string(),
            Self::ProductDetail(id) => format!("/product/{id}"),
            Self::Cart => "/cart".to_string(),
            Self::Favourites => "/favourites".to_string(),
            Self::Login => "/login".to_string(),
            Self::Checkout => "/checkout".to_string(),
            Self::Payment => "/payment-gateway".to_string(),
            Self::PaymentSuccess => "/payment-success".to_string(),
            Self::Profile => "/profile".to_string(),
            Self::About => "/about".to_string(),
            Self::Contact => "/contact".to_string(),
        }
    }

    /// Page for a URL path. A trailing slash is ignored.
    pub fn parse(path: &str) -> Option<Self> {
        let trimmed = path.trim_end_matches('/');

        let route = match trimmed {
            "" => Self::Home,
            "/products" => Self::Products,
            "/cart" => Self::Cart,
            "/favourites" => Self::Favourites,
            "/login" => Self::Login,
            "/checkout" => Self::Checkout,
            "/payment-gateway" => Self::Payment,
            "/payment-success" => Self::PaymentSuccess,
            "/profile" => Self::Profile,
            "/about" => Self::About,
            "/contact" => Self::Contact,
            other => {
                let id = other.strip_prefix("/product/")?;

                if id.is_empty() || id.contains('/') {
                    return None;
                }

                Self::ProductDetail(ProductId::new(id))
            }
        };

        Some(route)
    }

    /// Whether visiting this page requires a logged-in user.
    pub fn requires_auth(&self) -> bool {
        matches!(
            self,
            Self::Checkout | Self::Payment | Self::PaymentSuccess | Self::Profile
        )
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.path())
    }
}

/// Outcome of the login gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// Show the page
    Allow,

    /// Send the visitor to login, remembering where they were going
    RedirectToLogin {
        /// Intended destination
        from: Route,
    },
}

/// Gate `route` on authentication.
pub fn guard(route: &Route, authenticated: bool) -> Access {
    if route.requires_auth() && !authenticated {
        Access::RedirectToLogin {
            from: route.clone(),
        }
    } else {
        Access::Allow
    }
}

/// Where to go after logging in: the remembered destination, else the profile.
pub fn after_login(from: Option<Route>) -> Route {
    from.unwrap_or(Route::Profile)
}
