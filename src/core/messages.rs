// Author: Dustin Pilgrim
// License: MIT

use std::time::Duration;

use crate::core::error::TransitionError;

pub const MENU: &str = "Выберите действие:";
pub const ASK_NAME: &str = "Введите название таймера:";
pub const ASK_MINUTES: &str = "Введите время в минутах:";
pub const USAGE: &str = "Используй кнопки для работы с таймерами.";
pub const LOGS_EMPTY: &str = "🔍 Логи пусты.";
pub const SETUP_CANCELLED: &str = "Настройка таймера отменена.";

pub fn confirm(name: &str, duration: Duration) -> String {
    format!("Запустить таймер \"{}\" на {} минут?", name, minutes(duration))
}

pub fn started(name: &str, duration: Duration) -> String {
    format!("Таймер \"{}\" запущен на {} минут.", name, minutes(duration))
}

pub fn stopped(name: &str, expired: bool) -> String {
    let mut msg = format!("Таймер \"{}\" остановлен.", name);
    if expired {
        msg.push_str(" ⏳ Время истекло!");
    }
    msg
}

pub fn logs(body: &str) -> String {
    format!("📜 Логи таймеров:\n\n{}", body)
}

/// Guidance shown for a rejected transition.
pub fn rejected(err: TransitionError) -> &'static str {
    match err {
        TransitionError::NotConfigured => "Ошибка! Сначала настройте таймер.",
        TransitionError::AlreadyRunning => "Таймер уже запущен.",
        TransitionError::NothingToStop => "Нет активного таймера.",
        TransitionError::OutOfProtocol => USAGE,
        TransitionError::InvalidDuration => "Введите корректное время в минутах.",
        TransitionError::EmptyName => ASK_NAME,
    }
}

fn minutes(duration: Duration) -> u64 {
    duration.as_secs() / 60
}
