use serde::{Serialize, Serializer};

/// Entry points the UI navigates between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Admission,
    RegistrationPayment,
    AdminLogin,
    Dashboard,
    ForgotPassword,
    ResetPassword,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Admission => "/admission",
            Route::RegistrationPayment => "/registration-payment",
            Route::AdminLogin => "/login-admin",
            Route::Dashboard => "/Bosspannel",
            Route::ForgotPassword => "/forgot-password",
            Route::ResetPassword => "/reset-password",
        }
    }
}

impl Serialize for Route {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.path())
    }
}

/// Navigation instruction returned to the UI after a successful action.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Redirect {
    pub redirect: Route,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_after_ms: Option<u64>,
}

impl Redirect {
    pub fn to(route: Route) -> Self {
        Self { redirect: route, redirect_after_ms: None }
    }

    pub fn delayed(route: Route, after_ms: u64) -> Self {
        Self { redirect: route, redirect_after_ms: Some(after_ms) }
    }
}
