use super::{ApiError, FieldErrors, ProductPayload};
use crate::constants::images::{MAX_PER_PRODUCT, MIN_PER_PRODUCT};
use crate::constants::limits::{MAX_DESCRIPTION_LENGTH, MAX_NAME_LENGTH, MAX_SPEC_LENGTH};
use crate::domain::Condition;
use crate::models::{ImageSource, ProductDraft, ProductSpecs};

/// Checks an admin submission field by field and classifies its images.
///
/// Every failing field is reported, not just the first one. Hosted image
/// references must be http(s) URLs or single files under `public_prefix`.
pub fn validate_product(
    payload: ProductPayload,
    max_image_bytes: usize,
    public_prefix: &str,
) -> Result<ProductDraft, ApiError> {
    let mut errors = FieldErrors::new();

    let name = required_text(&mut errors, "name", payload.name, MAX_NAME_LENGTH);
    let brand = required_text(&mut errors, "brand", payload.brand, MAX_NAME_LENGTH);

    let price = match payload.price {
        None => {
            errors.insert("price".into(), "Price is required".into());
            0.0
        }
        Some(p) if !p.is_finite() || p <= 0.0 => {
            errors.insert("price".into(), "Price must be a positive number".into());
            0.0
        }
        Some(p) => p,
    };

    let condition = match payload.condition.as_deref().map(str::parse::<Condition>) {
        None => {
            errors.insert("condition".into(), "Condition is required".into());
            None
        }
        Some(Err(e)) => {
            errors.insert("condition".into(), e.to_string());
            None
        }
        Some(Ok(c)) => Some(c),
    };

    let images = validate_images(
        &mut errors,
        payload.images.unwrap_or_default(),
        max_image_bytes,
        public_prefix,
    );

    if payload.description.chars().count() > MAX_DESCRIPTION_LENGTH {
        errors.insert(
            "description".into(),
            format!("Description must be {MAX_DESCRIPTION_LENGTH} characters or less"),
        );
    }

    let specs = validate_specs(&mut errors, payload.specs);

    match condition {
        Some(condition) if errors.is_empty() => Ok(ProductDraft {
            name,
            brand,
            price,
            condition,
            images,
            specs,
            description: payload.description.trim().to_string(),
            featured: payload.featured,
            new_arrival: payload.new_arrival,
        }),
        _ => Err(ApiError::InvalidFields(errors)),
    }
}

fn required_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<String>,
    max_len: usize,
) -> String {
    let value = value.unwrap_or_default().trim().to_string();
    if value.is_empty() {
        errors.insert(field.to_string(), format!("{} is required", capitalize(field)));
    } else if value.chars().count() > max_len {
        errors.insert(
            field.to_string(),
            format!("{} must be {max_len} characters or less", capitalize(field)),
        );
    }
    value
}

fn validate_images(
    errors: &mut FieldErrors,
    raw: Vec<String>,
    max_image_bytes: usize,
    public_prefix: &str,
) -> Vec<ImageSource> {
    if !(MIN_PER_PRODUCT..=MAX_PER_PRODUCT).contains(&raw.len()) {
        errors.insert(
            "images".into(),
            format!("Between {MIN_PER_PRODUCT} and {MAX_PER_PRODUCT} images are required"),
        );
        return Vec::new();
    }

    let mut images = Vec::with_capacity(raw.len());
    for (index, value) in raw.iter().enumerate() {
        let field = format!("images[{index}]");
        match ImageSource::parse(value) {
            Ok(image) if image.inline_len() > max_image_bytes => {
                errors.insert(
                    field,
                    format!("Image exceeds the {max_image_bytes} byte limit"),
                );
            }
            Ok(ImageSource::Hosted(reference)) => {
                match check_hosted(&reference, public_prefix) {
                    Ok(()) => images.push(ImageSource::Hosted(reference)),
                    Err(message) => {
                        errors.insert(field, message);
                    }
                }
            }
            Ok(image) => images.push(image),
            Err(e) => {
                errors.insert(field, e.to_string());
            }
        }
    }
    images
}

/// Accepts absolute http(s) URLs and single file names under the local
/// image prefix. Anything else could not have come from an upload.
fn check_hosted(reference: &str, public_prefix: &str) -> Result<(), String> {
    let prefix = public_prefix.trim_end_matches('/');

    if let Some(name) = reference
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('/'))
    {
        return if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
            Err(format!("Image path must name a single file under {prefix}/"))
        } else {
            Ok(())
        };
    }

    match url::Url::parse(reference) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host().is_some() => Ok(()),
        _ => Err(format!("Image must be an http(s) URL or a file under {prefix}/")),
    }
}

fn validate_specs(errors: &mut FieldErrors, specs: ProductSpecs) -> ProductSpecs {
    let specs = ProductSpecs {
        processor: specs.processor.trim().to_string(),
        ram: specs.ram.trim().to_string(),
        storage: specs.storage.trim().to_string(),
        display: specs.display.trim().to_string(),
        battery: specs.battery.trim().to_string(),
    };

    for (field, value) in [
        ("processor", &specs.processor),
        ("ram", &specs.ram),
        ("storage", &specs.storage),
        ("display", &specs.display),
        ("battery", &specs.battery),
    ] {
        if value.chars().count() > MAX_SPEC_LENGTH {
            errors.insert(
                format!("specs.{field}"),
                format!("Must be {MAX_SPEC_LENGTH} characters or less"),
            );
        }
    }
    specs
}

/// Parses a comma-separated condition list such as `New,Used`.
pub fn parse_conditions(raw: Option<&str>) -> Result<Vec<Condition>, ApiError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };

    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<Condition>().map_err(|e| ApiError::validation(e.to_string())))
        .collect()
}

/// Parses the `max_price` query value. Blank means no ceiling was given.
pub fn validate_max_price(raw: Option<&str>) -> Result<Option<f64>, ApiError> {
    let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    match raw.parse::<f64>() {
        Ok(p) if p.is_finite() && p >= 0.0 => Ok(Some(p)),
        _ => Err(ApiError::validation(format!(
            "Invalid max_price: {raw}. Must be a non-negative number"
        ))),
    }
}

fn capitalize(field: &str) -> String {
    let mut chars = field.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
