pub mod images {

    pub const MIN_PER_PRODUCT: usize = 1;

    pub const MAX_PER_PRODUCT: usize = 5;

    /// Scheme marker that identifies an inline-encoded image in a submission.
    pub const INLINE_PREFIX: &str = "data:";
}

pub mod pricing {

    /// Slider ceiling used by clients when the catalog is empty.
    pub const FALLBACK_PRICE_CEILING: f64 = 5000.0;
}

pub mod credentials {

    pub const DEFAULT_USERNAME: &str = "admin";

    pub const DEFAULT_PASSWORD: &str = "admin123";

    pub const SESSION_USER_KEY: &str = "admin_user";
}

pub mod limits {

    pub const MAX_NAME_LENGTH: usize = 200;

    pub const MAX_DESCRIPTION_LENGTH: usize = 5000;

    pub const MAX_SPEC_LENGTH: usize = 200;
}
