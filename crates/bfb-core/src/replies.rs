//! Fixed user-facing reply templates.
//!
//! Internal error detail never crosses this boundary; collaborator and store
//! failures all collapse into `generic_failure`, with the detail going to
//! the log sink at the dispatch boundary.

use crate::domain::Reply;
use crate::gate::DenyReason;

pub fn greeting() -> Reply {
    Reply::Text(
        "👋 Привет! Я — BEST FRIEND 🤖\n\n\
         Я заменяю любые курсы: GPT-4, голос, картинки и даже видео. \
         3 запроса в день — бесплатно. Подписка: 399₽/мес или 2990₽/год. \
         Начни с запроса!"
            .to_string(),
    )
}

pub fn denied(reason: DenyReason) -> Reply {
    match reason {
        DenyReason::QuotaExceeded => Reply::Text(
            "🚫 Лимит бесплатных запросов на сегодня исчерпан.\n\n\
             Подписка снимает лимит: 399₽/мес или 2990₽/год."
                .to_string(),
        ),
    }
}

pub fn generic_failure() -> Reply {
    Reply::Text("❌ Что-то пошло не так. Попробуй ещё раз чуть позже.".to_string())
}

pub fn image_prompt_missing() -> Reply {
    Reply::Text("🖼 Введи запрос: `/сгенерируй девушка в балаклаве на фоне города`".to_string())
}

pub fn speech_text_missing() -> Reply {
    Reply::Text("🔊 Напиши что озвучить: `/скажи твой текст`".to_string())
}

pub fn voice_not_understood() -> Reply {
    Reply::Text("🎤 Не разобрал голосовое сообщение. Попробуй ещё раз.".to_string())
}

pub fn nothing_to_read() -> Reply {
    Reply::Text("📄 Не смог прочитать файл — текста в нём не нашлось.".to_string())
}
