
mod delete_tests;
mod recipe_tests;
