pub mod chatmodels;
pub mod interactionmodel;
pub mod jobmodel;
pub mod notificationmodel;
pub mod reviewmodel;
pub mod usermodel;
