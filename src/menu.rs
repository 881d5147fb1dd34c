/// Items that can be reviewed. Matching is exact and case-sensitive.
pub const MENU_ITEMS: &[&str] = &[
    "Hamburger",
    "Cheeseburger",
    "Double Cheeseburger",
    "Bacon Burger",
    "Veggie Burger",
    "Chicken Sandwich",
    "Spicy Chicken Sandwich",
    "Fish Sandwich",
    "Chicken Nuggets",
    "Fries",
    "Onion Rings",
    "Side Salad",
    "Hash Browns",
    "Breakfast Sandwich",
    "Pancakes",
    "Apple Pie",
    "Soft Serve Cone",
    "Sundae",
    "Milkshake",
    "Soda",
    "Iced Tea",
    "Coffee",
];

pub fn is_on_menu(item: &str) -> bool {
    MENU_ITEMS.contains(&item)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fries_are_on_the_menu() {
        assert!(is_on_menu("Fries"));
    }

    #[test]
    fn matching_is_exact() {
        assert!(!is_on_menu("fries"));
        assert!(!is_on_menu(" Fries"));
        assert!(!is_on_menu(""));
        assert!(!is_on_menu("Lobster Thermidor"));
    }
}
