// SPDX-License-Identifier: MIT OR Apache-2.0
//! Demo skill used by `ordoplay_skill_sim sample`.

use ordoplay_skill_sequencer::{
    AnimationClip, AttachBinding, AudioClip, BindPoint, CameraClip, CameraEffect, Clip, ClipKind,
    ClipType, DamageDetectClip, EventClip, Group, HitShape, MovementClip, SpawnClip, Timeline,
    Track,
};

/// A one-second sword slash touching every clip kind
pub fn sample_timeline() -> Timeline {
    let body = Group::new("Body")
        .with_track(Track::new("Upper Body", ClipType::Animation).with_clip(Clip::new(
            "Slash",
            0.0,
            0.8,
            ClipKind::Animation(AnimationClip::new("anim/slash", 1).with_mask("mask/upper_body")),
        )))
        .with_track(Track::new("Root Motion", ClipType::Movement).with_clip(Clip::new(
            "Lunge",
            0.1,
            0.3,
            ClipKind::Movement(MovementClip {
                displacement: [0.0, 0.0, 1.5],
                local_space: true,
            }),
        )));

    let mut hit = DamageDetectClip::new(HitShape::Sector { radius: 2.0, angle: 120.0 }, "slash_hit");
    hit.attach = AttachBinding::point(BindPoint::Weapon);
    hit.tags = vec!["melee".into(), "slash".into()];
    hit.max_targets = Some(3);

    let mut trail = SpawnClip::new("fx/slash_trail", AttachBinding::point(BindPoint::Weapon));
    trail.tag = "trail".into();

    let effects = Group::new("Effects")
        .with_track(Track::new("Sound", ClipType::Audio).with_clip(Clip::new(
            "Whoosh",
            0.15,
            0.4,
            ClipKind::Audio(AudioClip::new("sfx/whoosh")),
        )))
        .with_track(Track::new("VFX", ClipType::Spawn).with_clip(Clip::new(
            "Trail",
            0.2,
            0.25,
            ClipKind::Spawn(trail),
        )))
        .with_track(Track::new("Camera", ClipType::Camera).with_clip(Clip::new(
            "Impact Shake",
            0.3,
            0.2,
            ClipKind::Camera(CameraClip {
                effect: CameraEffect::Shake {
                    intensity: 0.3,
                    frequency: 25.0,
                },
                blend_duration: 0.05,
            }),
        )));

    let gameplay = Group::new("Gameplay")
        .with_track(Track::new("Hitbox", ClipType::DamageDetect).with_clip(Clip::new(
            "Hit Window",
            0.3,
            0.15,
            ClipKind::DamageDetect(hit),
        )))
        .with_track(Track::new("Events", ClipType::Event).with_clip(Clip::new(
            "Combo Window",
            0.6,
            0.2,
            ClipKind::Event(EventClip::new("combo_window").with_param("next", "slash_2")),
        )));

    Timeline::new("Sword Slash", 1.0)
        .with_group(body)
        .with_group(effects)
        .with_group(gameplay)
}
