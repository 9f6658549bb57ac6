//! Prompt synthesis for the image-generation service.
//!
//! Each category owns one fixed template describing how that product sits on a
//! real vehicle. Synthesis is a pure substitution: the same inputs always give
//! the same prompt.

use crate::category::ProductCategory;

/// Vehicle description used when the vision call fails or returns nothing.
pub const FALLBACK_VEHICLE: &str = "a modern car";

/// Longest vehicle description carried into a prompt.
const MAX_VEHICLE_CHARS: usize = 200;

/// Inputs to [`synthesize_prompt`].
#[derive(Debug, Clone)]
pub struct PromptInput<'a> {
    pub category: ProductCategory,
    pub name: &'a str,
    pub description: &'a str,
    pub vehicle: &'a str,
}

/// Resolve the outcome of the vehicle-description call to the text used in prompts.
///
/// Errors, empty answers, and whitespace all collapse to [`FALLBACK_VEHICLE`].
pub fn vehicle_or_fallback<E: std::fmt::Display>(described: Result<String, E>) -> String {
    match described {
        Ok(text) => {
            let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
            let text = text.trim_end_matches('.');
            if text.is_empty() {
                FALLBACK_VEHICLE.to_string()
            } else {
                crate::product::truncate_chars(text, MAX_VEHICLE_CHARS)
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "vehicle description failed, using fallback");
            FALLBACK_VEHICLE.to_string()
        }
    }
}

/// Build the image-generation instruction for a classified product.
pub fn synthesize_prompt(input: &PromptInput<'_>) -> String {
    let name = input.name.trim();
    let vehicle = match input.vehicle.trim() {
        "" => FALLBACK_VEHICLE,
        v => v,
    };

    let body = match input.category {
        ProductCategory::Headlight => format!(
            "Install the \"{name}\" LED headlights on {vehicle} in this photo. Both headlight housings \
             glow with a bright white, crisp beam and a cool 6000K tone, as if switched on at dusk."
        ),
        ProductCategory::Taillight => format!(
            "Install the \"{name}\" LED taillights on {vehicle} in this photo. The rear lamps glow a \
             bright red with even, modern light distribution across both sides of the vehicle."
        ),
        ProductCategory::Indicator => format!(
            "Install the \"{name}\" LED turn indicators on {vehicle} in this photo. The indicators \
             flash a vivid amber at the front corners and side mirrors, clearly visible but not blinding."
        ),
        ProductCategory::Lightbar => format!(
            "Mount the \"{name}\" LED light bar on {vehicle} in this photo, on the roof or front bumper \
             where it fits naturally. It emits a powerful white beam and the brackets look factory-fitted."
        ),
        ProductCategory::Foglight => format!(
            "Install the \"{name}\" LED fog lights in the lower front bumper of {vehicle} in this photo. \
             They cast a wide, low beam in white or selective yellow that lights the road close ahead."
        ),
        ProductCategory::Interior => format!(
            "Fit the \"{name}\" LED interior lighting inside {vehicle} in this photo. Soft ambient light \
             shows through the windows and illuminates the cabin, dashboard, and footwells."
        ),
        ProductCategory::License => format!(
            "Install the \"{name}\" LED license plate lights on {vehicle} in this photo. The rear plate is \
             lit with a clean white glow that leaves the characters sharp and readable."
        ),
        ProductCategory::Spoiler => format!(
            "Add the \"{name}\" rear spoiler to {vehicle} in this photo, positioned naturally on the trunk \
             lid and painted to match the body, as if professionally installed."
        ),
        ProductCategory::Wheels => format!(
            "Replace the wheels of {vehicle} in this photo with the \"{name}\" wheels. Keep proportional \
             size and correct perspective on every visible wheel, with tyres seated naturally."
        ),
        ProductCategory::Decals => format!(
            "Apply the \"{name}\" decals to the sides of {vehicle} in this photo. The graphics follow the \
             natural curves of the bodywork and look like a real vinyl application."
        ),
        ProductCategory::Exhaust => format!(
            "Add the \"{name}\" sport exhaust to the lower rear of {vehicle} in this photo. The tips sit \
             centred in the bumper cut-outs and look professionally installed."
        ),
        ProductCategory::Generic => format!(
            "Add the automotive product \"{name}\" to {vehicle} in this photo in a realistic, natural way. \
             The product should look professionally installed where it would normally be fitted."
        ),
    };

    let description = input.description.trim();
    let details = if description.is_empty() { String::new() } else { format!(" Product details: {description}") };

    format!(
        "{body}{details} Keep the original lighting, shadows, reflections, camera angle, and background \
         unchanged. The result must look like a real photograph."
    )
}
