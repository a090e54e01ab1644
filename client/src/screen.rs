/// The screens of the stamp card front end. Exactly one is visible at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Welcome,
    Login,
    Register,
    StampCard,
    StampAdded,
    FreeCoffee,
    Profile,
}

impl Screen {
    pub const ALL: [Screen; 7] = [
        Screen::Welcome,
        Screen::Login,
        Screen::Register,
        Screen::StampCard,
        Screen::StampAdded,
        Screen::FreeCoffee,
        Screen::Profile,
    ];

    /// Element id of the screen in the browser front end.
    pub fn element_id(self) -> &'static str {
        match self {
            Screen::Welcome => "welcome-screen",
            Screen::Login => "login-screen",
            Screen::Register => "register-screen",
            Screen::StampCard => "stampcard-screen",
            Screen::StampAdded => "stampadded-screen",
            Screen::FreeCoffee => "freecoffee-screen",
            Screen::Profile => "profile-screen",
        }
    }
}
