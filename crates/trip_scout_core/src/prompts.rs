//! crates/trip_scout_core/src/prompts.rs
//!
//! Prompt construction for the three scouts and the single-item replace scout.

use crate::domain::{MealType, ScoutCategory, ScoutRequest, TravellerProfile};

pub const PHOTO_MAX_TOKENS: u32 = 6000;
pub const DINING_MAX_TOKENS: u32 = 5000;
pub const ATTRACTION_MAX_TOKENS: u32 = 5000;
pub const REPLACE_MAX_TOKENS: u32 = 1200;

/// A fully built model request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoutPrompt {
    pub system: String,
    pub user: String,
    pub max_output_tokens: u32,
}

//=========================================================================================
// Shared blocks
//=========================================================================================

fn accommodation_block(category: ScoutCategory, accommodation: Option<&str>) -> String {
    match accommodation {
        Some(address) => {
            let mut block = format!("- Accommodation / travel base: {}\n", address);
            if category == ScoutCategory::Attractions {
                block.push_str(
                    "  Cluster each day's stops by area so the client never doubles back.\n",
                );
            }
            block.push_str(
                "  Work out every distance and travel time from this address, not from the city centre.\n",
            );
            block
        }
        None => "- Accommodation: not given. Treat the city centre as the travel base.\n".to_string(),
    }
}

fn pre_planned_block(category: ScoutCategory, pre_planned: Option<&str>) -> String {
    let Some(text) = pre_planned else {
        return String::new();
    };
    let mut block = format!("Already booked or committed:\n  {}\n", text);
    match category {
        ScoutCategory::Photos => block.push_str(
            "  Never suggest a location that repeats or clashes with these.\n",
        ),
        ScoutCategory::Restaurants => block.push_str(
            "  Never suggest a restaurant that repeats or clashes with these.\n  \
             When a meal slot is already taken by a booking, leave that slot out instead of offering a rival.\n",
        ),
        ScoutCategory::Attractions => block.push_str(
            "  Never suggest anything that repeats or clashes with these.\n  \
             Plan around committed time slots: suggest nearby stops that fit before or after them.\n",
        ),
    }
    block
}

fn profile_lines(
    category: ScoutCategory,
    destination: &str,
    profile: &TravellerProfile,
) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(style) = &profile.travel_style {
        lines.push(format!("  Travel style: {}", style));
    }
    if let Some(budget) = &profile.preferred_budget {
        lines.push(match category {
            ScoutCategory::Photos => format!("  Budget tier: {}", budget),
            ScoutCategory::Restaurants => {
                format!("  Budget preference: {} (use it to pick the price tier)", budget)
            }
            ScoutCategory::Attractions => format!(
                "  Budget preference: {} (apply it to admission and tour costs)",
                budget
            ),
        });
    }
    if let Some(home) = &profile.home_city {
        lines.push(match category {
            ScoutCategory::Photos => format!(
                "  Home city: {} (skip anything they could easily shoot at home)",
                home
            ),
            ScoutCategory::Restaurants => format!(
                "  Home city: {} (skip chains and cuisines they can get at home; favour independent places and dishes local to the destination)",
                home
            ),
            ScoutCategory::Attractions => format!(
                "  Home city: {} (skip anything that mirrors what they have at home; favour experiences only {} offers)",
                home, destination
            ),
        });
    }
    if let Some(diet) = &profile.dietary_requirements {
        lines.push(match category {
            ScoutCategory::Photos => format!(
                "  Dietary requirements: {} (respect them wherever a stop involves food, such as a café or market)",
                diet
            ),
            ScoutCategory::Restaurants => format!(
                "  Dietary requirements: {} (HARD CONSTRAINT. No restaurant or dish may conflict with these. Check the menu before recommending.)",
                diet
            ),
            ScoutCategory::Attractions => format!(
                "  Dietary requirements: {} (any food-based stop such as a market, cooking class or winery must be compatible)",
                diet
            ),
        });
    }
    if let Some(notes) = &profile.notes {
        lines.push(format!("  Consultant notes: {}", notes));
    }
    lines
}

fn client_block(category: ScoutCategory, request: &ScoutRequest) -> String {
    let lines = request
        .profile
        .as_ref()
        .map(|p| profile_lines(category, &request.destination, p))
        .unwrap_or_default();
    if lines.is_empty() {
        "Client profile: none provided; give broadly appealing recommendations.\n".to_string()
    } else {
        format!("Client profile:\n{}\n", lines.join("\n"))
    }
}

const STYLE_RULES: &str = "\
- Open every field with the useful fact. No scene-setting openers.
- Name what is actually there instead of how it feels.
- One earned adjective beats a stack of vague ones.
- Practical detail (timing, where to stand, what to order) beats atmosphere.
- Be honest about trade-offs such as crowds, queues or cash-only, and say when they ease.
- Keep sentences short and cut every word that does not earn its place.";

fn banned_words(category: ScoutCategory) -> &'static str {
    match category {
        ScoutCategory::Photos => "stunning, breathtaking, magical, enchanting, iconic, world-class, vibrant, \
nestled, boasting, hidden gem, off the beaten path, a feast for the senses, evocative, timeless",
        ScoutCategory::Restaurants => "culinary journey, gastronomic, tantalise, exquisite, artisanal, world-class, \
iconic, hidden gem, vibrant, buzzing, a feast for the senses, unforgettable",
        ScoutCategory::Attractions => "stunning, breathtaking, magical, iconic, world-class, unmissable, legendary, \
nestled, boasting, rich history, vibrant, hidden gem, off the beaten path",
    }
}

//=========================================================================================
// Output schemas
//=========================================================================================

fn schema(category: ScoutCategory, full: bool) -> &'static str {
    match (category, full) {
        (ScoutCategory::Photos, true) => r#"{
  "day": [day number],
  "time": "[time window, e.g. 6:30-7:30am]",
  "name": "[exact location name]",
  "address": "[street address or neighbourhood]",
  "coordinates": "[latitude, longitude or an area description]",
  "travel_time": "[rough travel time from the accommodation, e.g. '8 min walk'. 'N/A' when no accommodation was given.]",
  "subject": "[1-2 sentences: what the camera points at and why it suits this client]",
  "setup": "[2-3 sentences: where to stand, focal length, framing. Instructions a photographer can follow on the spot.]",
  "light": "[2 sentences: light direction, the best window, what changes once it closes]",
  "pro_tip": "[1-2 sentences: one honest, usable tip on crowds, angles, settings or season]"
}"#,
        (ScoutCategory::Photos, false) => r#"{
  "day": [day number],
  "time": "[best time window]",
  "name": "[exact location name]",
  "address": "[street address]",
  "coordinates": "[lat, lng or area]",
  "travel_time": "N/A",
  "subject": "[what to shoot and why it works]",
  "setup": "[where to stand, focal length, framing]",
  "light": "[light direction and best window]",
  "pro_tip": "[one honest, usable tip]"
}"#,
        (ScoutCategory::Restaurants, true) => r#"{
  "day": [day number],
  "meal_type": "[breakfast/lunch/dinner]",
  "name": "[restaurant name]",
  "address": "[full address]",
  "location": "[neighbourhood]",
  "cuisine": "[cuisine type]",
  "travel_time": "[rough travel time from the accommodation, e.g. '5 min walk'. 'N/A' when no accommodation was given.]",
  "description": "[2 sentences: what the place is and what to order, naming the dish]",
  "price": "[$/$$/$$$/$$$$]",
  "signature_dish": "[the one dish most worth ordering]",
  "ambiance": "[1 sentence: noise, seating, crowd and formality as you walk in]",
  "hours": "[opening hours]",
  "why_this_client": "[1 sentence: why this pick suits the client, or the stated cuisine and budget if there is no profile]",
  "insider_tip": "[1-2 sentences: booking advice, best seat, timing, or what most visitors miss]"
}

Price scale: $ = budget or street food, $$ = moderate, $$$ = moderately expensive, $$$$ = fine dining."#,
        (ScoutCategory::Restaurants, false) => r#"{
  "day": [day number],
  "meal_type": "[breakfast/lunch/dinner]",
  "name": "[restaurant name]",
  "address": "[full address]",
  "location": "[neighbourhood]",
  "cuisine": "[cuisine type]",
  "travel_time": "N/A",
  "description": "[2 sentences: what it is and what to order, naming the dish]",
  "price": "[$/$$/$$$/$$$$]",
  "signature_dish": "[the one dish worth ordering]",
  "ambiance": "[1 sentence: what you find as you walk in]",
  "hours": "[hours]",
  "why_this_client": "[why this suits the stated preferences]",
  "insider_tip": "[one piece of practical advice]"
}"#,
        (ScoutCategory::Attractions, true) => r#"{
  "day": [day number],
  "time": "[time slot, e.g. 9:00-11:00am]",
  "name": "[attraction name]",
  "address": "[full address]",
  "category": "[museum / market / viewpoint / park / ...]",
  "location": "[neighbourhood]",
  "travel_time": "[rough travel time from the accommodation, e.g. '15 min metro'. 'N/A' when no accommodation was given.]",
  "description": "[2 sentences: what it is and the one reason it is worth this client's time, caveats included]",
  "admission": "[free / price range]",
  "hours": "[opening hours]",
  "duration": "[realistic visit length]",
  "best_time": "[specific, e.g. 'weekday mornings before 10am']",
  "why_this_client": "[1 sentence: why it suits this client's profile or interests]",
  "highlight": "[the single best thing, named specifically]",
  "insider_tip": "[1-2 sentences: one practical thing most visitors do not know]"
}"#,
        (ScoutCategory::Attractions, false) => r#"{
  "day": [day number],
  "time": "[time slot]",
  "name": "[attraction name]",
  "address": "[full address]",
  "category": "[type]",
  "location": "[neighbourhood]",
  "travel_time": "N/A",
  "description": "[2 sentences: what it is and why it is worth the visit]",
  "admission": "[free / price]",
  "hours": "[hours]",
  "duration": "[realistic visit length]",
  "best_time": "[specific time advice]",
  "why_this_client": "[why this suits the stated preferences]",
  "highlight": "[single best specific thing]",
  "insider_tip": "[one practical tip most visitors miss]"
}"#,
    }
}

//=========================================================================================
// Full scout prompts
//=========================================================================================

fn persona(category: ScoutCategory) -> &'static str {
    match category {
        ScoutCategory::Photos => "You are a photography location scout who writes practical, plain shooting guides. \
Every pick is tailored to one client: let their profile decide difficulty, walking distance, time of day and subject.",
        ScoutCategory::Restaurants => "You are a dining guide writer who gives clear, honest restaurant picks \
tailored to one client. Let their profile shape every choice.",
        ScoutCategory::Attractions => "You are a travel writer who gives practical sightseeing picks \
tailored to one client. Let their profile shape every choice.",
    }
}

fn personalisation_rules(category: ScoutCategory) -> &'static str {
    match category {
        ScoutCategory::Photos => "\
- Match the travel style: active travellers get rooftops and dawn spots, relaxed ones get terraces and parks.
- Fold access costs such as paid viewpoints or permits into the budget tier.
- Skip locations that resemble the client's home city.
- With an accommodation address, give the walking or transit time from it for every location using real streets.
- Never suggest a pre-planned location or a duplicate of one; mention it only to point at a nearby complementary spot.
- Consultant notes about physical limits or other constraints are absolute.",
        ScoutCategory::Restaurants => "\
- Cuisine preferences are a starting point. Add other good fits the profile suggests and say why.
- When the profile budget and the form budget disagree, the profile wins.
- Skip chains and cuisines the client can easily get at home; lean into what is local and hard to find elsewhere.
- With an accommodation address, give the walking or transit time from it for every restaurant.
- DIETARY REQUIREMENTS ARE ABSOLUTE. Every restaurant and every suggested dish must be compatible.
- If a meal is already booked for a day, do not add a rival for that slot.
- Mix price tiers across the day unless the profile asks for one tier.",
        ScoutCategory::Attractions => "\
- Category preferences are a starting point; the profile picks the specific venues within them.
- Skip anything that mirrors a famous draw of the client's home city in favour of something distinctive here.
- Let travel style set pace and depth.
- Honour the budget preference for admissions and paid experiences.
- Never duplicate pre-planned commitments; suggest what to do before or after them instead.
- With an accommodation address, order each day to avoid backtracking and give travel time from it for each stop.
- Food-based stops must respect dietary requirements.
- Consultant notes are hard constraints.",
    }
}

fn build_system(category: ScoutCategory) -> String {
    format!(
        "{persona}\n\nPERSONALISATION RULES:\n{rules}\n\nWRITING STYLE (strict):\n{style}\n- Forbidden words: {banned}.\n\n\
OUTPUT FORMAT: return exactly this JSON object for every item, one object per line, no markdown:\n{schema}",
        persona = persona(category),
        rules = personalisation_rules(category),
        style = STYLE_RULES,
        banned = banned_words(category),
        schema = schema(category, true),
    )
}

fn max_tokens(category: ScoutCategory) -> u32 {
    match category {
        ScoutCategory::Photos => PHOTO_MAX_TOKENS,
        ScoutCategory::Restaurants => DINING_MAX_TOKENS,
        ScoutCategory::Attractions => ATTRACTION_MAX_TOKENS,
    }
}

/// Builds the prompt for a full scout run.
pub fn scout_prompt(category: ScoutCategory, request: &ScoutRequest) -> ScoutPrompt {
    let count = request.expected_count();
    let header = match category {
        ScoutCategory::Photos => format!(
            "Generate {} photography locations ({} per day), spread across {} days.",
            count, request.per_day, request.duration
        ),
        ScoutCategory::Restaurants => format!(
            "Generate {} restaurant recommendations ({} per day across {} days),\n\
             rotating sensibly through breakfast, lunch and dinner.",
            count, request.per_day, request.duration
        ),
        ScoutCategory::Attractions => format!(
            "Generate {} attractions ({} per day across {} days).",
            count, request.per_day, request.duration
        ),
    };
    let interest_line = match category {
        ScoutCategory::Photos => format!("- Photography interests: {}", request.interests),
        ScoutCategory::Restaurants => format!(
            "- Cuisine preferences from the consultant: {}\n- Budget range: {}",
            request.interests, request.budget
        ),
        ScoutCategory::Attractions => format!(
            "- Attraction interests: {}\n- Budget: {}",
            request.interests, request.budget
        ),
    };

    let user = format!(
        "{header}\n\nTrip details:\n- Destination: {destination}\n- Duration: {duration} days\n{interests}\n\
- Max travel radius: {radius}\n{accommodation}\n{pre_planned}\n{client}\n\
Provide {count} complete JSON objects, one per line. No markdown, no other text.",
        header = header,
        destination = request.destination,
        duration = request.duration,
        interests = interest_line,
        radius = request.radius,
        accommodation = accommodation_block(category, request.accommodation.as_deref()),
        pre_planned = pre_planned_block(category, request.pre_planned.as_deref()),
        client = client_block(category, request),
        count = count,
    );

    ScoutPrompt {
        system: build_system(category),
        user,
        max_output_tokens: max_tokens(category),
    }
}

//=========================================================================================
// Replace prompt
//=========================================================================================

/// Builds the prompt for one substitute item.
pub fn replace_prompt(
    category: ScoutCategory,
    request: &ScoutRequest,
    day: u32,
    meal_type: Option<MealType>,
    exclude_names: &[String],
) -> ScoutPrompt {
    let exclude_block = if exclude_names.is_empty() {
        String::new()
    } else {
        let list: Vec<String> = exclude_names.iter().map(|n| format!("  - {}", n)).collect();
        format!(
            "IMPORTANT: Do NOT suggest any of the following (already in the guide):\n{}\n",
            list.join("\n")
        )
    };
    let day_context = format!("Day {} of a {}-day trip.", day, request.duration);

    let (role, noun, diet_hint) = match category {
        ScoutCategory::Photos => (
            "You are a photography location scout.",
            "real, currently accessible photography location",
            None,
        ),
        ScoutCategory::Restaurants => (
            "You are a dining guide writer.",
            "real restaurant",
            request
                .profile
                .as_ref()
                .and_then(|p| p.dietary_requirements.as_ref())
                .map(|diet| {
                    format!(
                        "DIETARY HARD CONSTRAINT: never suggest anything incompatible with: {}",
                        diet
                    )
                }),
        ),
        ScoutCategory::Attractions => (
            "You are a travel writer.",
            "real, currently accessible attraction",
            None,
        ),
    };

    let mut system = format!(
        "{}\nFind ONE {} that has NOT already been suggested.\n",
        role, noun
    );
    if let Some(hint) = diet_hint {
        system.push_str(&hint);
        system.push('\n');
    }
    system.push_str("Return EXACTLY one JSON object, no markdown, no other text:\n");
    system.push_str(schema(category, false));

    let (subject, interest_label, fallback) = match category {
        ScoutCategory::Photos => ("photography location", "Photography interests", "general"),
        ScoutCategory::Restaurants => ("restaurant", "Cuisine preferences", "any local"),
        ScoutCategory::Attractions => ("attraction", "Attraction interests", "general sightseeing"),
    };
    let interests = if request.interests.is_empty() {
        fallback
    } else {
        request.interests.as_str()
    };
    let context = match meal_type {
        Some(meal) if category == ScoutCategory::Restaurants => {
            format!("{} This should be a {} option.", day_context, meal.as_str())
        }
        _ => day_context,
    };

    let user = format!(
        "Find one {} in {}.\n\n{}\nContext: {}\n{}: {}\nBudget: {} | Travel radius: {}",
        subject,
        request.destination,
        exclude_block,
        context,
        interest_label,
        interests,
        request.budget,
        request.radius,
    );

    ScoutPrompt {
        system,
        user,
        max_output_tokens: REPLACE_MAX_TOKENS,
    }
}
