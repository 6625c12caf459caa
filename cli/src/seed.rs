use anyhow::{Context, Result};
use reqwest::multipart::Form;

use crate::client::{Client, LoginRequest, SignupRequest};

struct SeedRecipe {
    title: &'static str,
    description: &'static str,
    /// Comma-separated, as the web form submits them.
    ingredients: &'static str,
    /// One step per line.
    steps: &'static str,
    rating: u8,
}

const SAMPLE_RECIPES: &[SeedRecipe] = &[
    SeedRecipe {
        title: "Classic Spaghetti Carbonara",
        description: "A rich and creamy Italian pasta dish with eggs, cheese, and pancetta.",
        ingredients: "400g spaghetti, 200g pancetta, 4 large eggs, 100g Pecorino Romano, black pepper, salt",
        steps: "Cook spaghetti in salted water until al dente.
Fry the pancetta until crispy.
Whisk eggs, cheese and pepper together.
Toss hot pasta with pancetta off the heat.
Stir in the egg mixture, loosening with pasta water.",
        rating: 5,
    },
    SeedRecipe {
        title: "Chicken Tikka Masala",
        description: "Tender chicken pieces in a creamy, spiced tomato sauce.",
        ingredients: "800g chicken thighs, 1 cup yogurt, 2 tbsp garam masala, 1 tsp cumin, 2 onions, 4 cloves garlic, 400g tomato puree, 1 cup cream",
        steps: "Marinate chicken in yogurt and spices for two hours.
Grill the chicken until charred.
Soften onions and garlic, then add tomato and cream.
Simmer the chicken in the sauce for 10 minutes.",
        rating: 4,
    },
    SeedRecipe {
        title: "Banana Bread",
        description: "Moist banana bread, perfect for overripe bananas.",
        ingredients: "3 ripe bananas, 1/3 cup melted butter, 3/4 cup sugar, 1 egg, 1 tsp vanilla, 1 tsp baking soda, 1.5 cups flour",
        steps: "Preheat oven to 175C and grease a loaf pan.
Mash bananas and mix in butter, sugar, egg and vanilla.
Fold in baking soda and flour.
Bake for 55 to 65 minutes.",
        rating: 4,
    },
    SeedRecipe {
        title: "Thai Green Curry",
        description: "Aromatic coconut curry with vegetables.",
        ingredients: "2 tbsp green curry paste, 400ml coconut milk, 1 aubergine, 1 red pepper, fish sauce, Thai basil",
        steps: "Fry curry paste in oil until fragrant.
Add coconut milk and bring to a simmer.
Add vegetables and cook until tender.
Season with fish sauce and finish with basil.",
        rating: 3,
    },
];

fn recipe_form(recipe: &SeedRecipe) -> Form {
    Form::new()
        .text("title", recipe.title)
        .text("description", recipe.description)
        .text("ingredients", recipe.ingredients)
        .text("steps", recipe.steps)
}

pub async fn seed(server: &str, name: &str, email: &str, password: &str) -> Result<()> {
    let mut client = Client::new(server);

    let existing = client
        .login(&LoginRequest { email, password })
        .await
        .context("Failed to log in")?;

    if existing.is_some() {
        println!("User '{}' already exists, skipping seed", email);
        return Ok(());
    }

    let signup = client
        .signup(&SignupRequest {
            name,
            email,
            password,
        })
        .await
        .context("Failed to create user")?;
    println!("Created new user: {} ({})", email, signup.user_id);
    client.set_token(signup.token);

    println!("Creating {} sample recipes...", SAMPLE_RECIPES.len());

    for sample in SAMPLE_RECIPES {
        let recipe = client
            .create_recipe(recipe_form(sample))
            .await
            .with_context(|| format!("Failed to create recipe: {}", sample.title))?;

        let rated = client
            .rate_recipe(&recipe.id, sample.rating)
            .await
            .with_context(|| format!("Failed to rate recipe: {}", sample.title))?;

        println!(
            "  Created: {} (rated {:.1} from {} rating(s))",
            rated.title, rated.average_rating, rated.total_ratings
        );
    }

    let total = client.list_recipes().await?.len();

    println!();
    println!("{}", "=".repeat(50));
    println!("SEED DATA COMPLETE");
    println!("{}", "=".repeat(50));
    println!("Email: {}", email);
    println!("Password: {}", password);
    println!("Base URL: {}", server);
    println!("Recipes on server: {}", total);
    println!("{}", "=".repeat(50));

    Ok(())
}
