mod hotkey;
