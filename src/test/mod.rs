use crate::res::{
    codec::write_file, Label, ResMenu, ResMenuItem, ResObject, ResShortcut, ResWindow, SpriteArea,
};

// Helper function to create a menu with a title and two items
pub fn create_menu(name: &str) -> ResMenu {
    let mut menu = ResMenu::new(name);
    menu.set_title(Some("Demo"), None).unwrap();
    menu.add(&ResMenuItem::with_text(1, "Info").unwrap()).unwrap();
    menu.add(&ResMenuItem::with_text(2, "Quit").unwrap()).unwrap();
    menu
}

// Helper function to create a window with one shortcut and one label
pub fn create_window(name: &str) -> ResWindow {
    let mut window = ResWindow::new(name);

    let mut shortcut = ResShortcut::new(0x1B, 0x100);
    shortcut.set_show(Some("Main")).unwrap();
    window.add_shortcut(&shortcut).unwrap();

    let mut label = Label::new();
    label.set_component_id(3).unwrap();
    label.set_label(Some("Greetings")).unwrap();
    window.add_gadget(&label).unwrap();
    window
}

// Helper function to create an object of an unknown class with an int and a sprite area slot
pub fn create_plain(name: &str) -> ResObject {
    let mut plain = ResObject::new(name, 0x1234, 100, 12);
    plain.set_int(8, 99).unwrap();
    plain.set_sprite_area_ref(4, Some(SpriteArea::CLIENT)).unwrap();
    plain
}

// Helper function to serialize the menu "Main", the window "Window" and the object "Plain"
pub fn create_file() -> Vec<u8> {
    let objects: [ResObject; 3] = [
        create_menu("Main").into(),
        create_window("Window").into(),
        create_plain("Plain"),
    ];
    write_file(objects.iter()).unwrap()
}
